//! File-level operations backing the CLI
//!
//! The codec itself never persists keys or sealed messages; this module is
//! the caller that does. Keys and sealed messages are stored as a single
//! base64 line. Secret material (secret keys, recovered plaintext) is
//! written with mode 0o600 on Unix systems.

use crate::b64;
use crate::error::{ErrorCategory, ErrorKind, Result, SealboxError};
use crate::sealedbox::{self, PublicKey, SecretKey};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Generate a fresh keypair and write both keys base64-encoded
///
/// The public key file is world-readable; the secret key file is created
/// with mode 0o600 on Unix systems.
pub fn generate_keypair_files(public_path: &Path, secret_path: &Path) -> Result<()> {
    let keypair = sealedbox::generate_keypair()?;

    let public_line = format!("{}\n", b64::encode(keypair.public_key.as_bytes()));
    fs::write(public_path, public_line).map_err(|e| {
        SealboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to write public key to {}", public_path.display()),
            e,
        )
    })?;

    let secret_line = format!("{}\n", b64::encode(keypair.secret_key.as_bytes()));
    write_file_secure(secret_path, secret_line.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write secret key to {}", secret_path.display())))?;

    Ok(())
}

/// Seal a file for a recipient public key
///
/// Reads plaintext from `input_path` and the recipient's base64 public key
/// from `public_key_path`, then writes the base64 sealed message to
/// `output_path`. The result can only be opened by the holder of the
/// matching secret key.
pub fn seal_file(input_path: &Path, public_key_path: &Path, output_path: &Path) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let public_key = read_public_key(public_key_path)?;

    let sealed = sealedbox::seal(&plaintext, &public_key)
        .map_err(|e| e.with_context("sealing failed"))?;
    let encoded = format!("{}\n", b64::encode(&sealed));

    write_file_secure(output_path, encoded.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Open a sealed file and recover the plaintext
///
/// Reads the base64 sealed message from `input_path` and the recipient's
/// base64 keys from `public_key_path`/`secret_key_path`, then writes the
/// recovered plaintext to `output_path` with mode 0o600 on Unix systems.
pub fn open_file(
    input_path: &Path,
    public_key_path: &Path,
    secret_key_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let sealed = read_base64_file(input_path)
        .map_err(|e| e.with_context(format!("failed to read sealed input {}", input_path.display())))?;
    let public_key = read_public_key(public_key_path)?;
    let secret_key = read_secret_key(secret_key_path)?;

    let plaintext = sealedbox::open(&sealed, &public_key, &secret_key)
        .map_err(|e| e.with_context("failed to open sealed box"))?;

    write_file_secure(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

fn read_public_key(path: &Path) -> Result<PublicKey> {
    let bytes = read_base64_file(path)
        .map_err(|e| e.with_context(format!("failed to read public key {}", path.display())))?;
    PublicKey::from_slice(&bytes)
        .map_err(|e| e.with_context(format!("invalid public key in {}", path.display())))
}

fn read_secret_key(path: &Path) -> Result<SecretKey> {
    let bytes = read_base64_file(path)
        .map_err(|e| e.with_context(format!("failed to read secret key {}", path.display())))?;
    SecretKey::from_slice(&bytes)
        .map_err(|e| e.with_context(format!("invalid secret key in {}", path.display())))
}

/// Read a file holding a single base64 line, tolerating surrounding whitespace
fn read_base64_file(path: &Path) -> Result<Vec<u8>> {
    let raw = fs::read(path).map_err(|e| read_error(path, e))?;
    let text = String::from_utf8(raw).map_err(|e| {
        SealboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            "file is not valid UTF-8",
            e,
        )
    })?;
    b64::decode(text.trim())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                SealboxError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            SealboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            SealboxError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> SealboxError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    SealboxError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sealedbox::{PUBLIC_KEY_LEN, SEAL_OVERHEAD, SECRET_KEY_LEN};
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_keygen_writes_decodable_keys() {
        let temp_dir = TempDir::new().unwrap();
        let public_path = temp_dir.path().join("key.pub");
        let secret_path = temp_dir.path().join("key.sec");

        generate_keypair_files(&public_path, &secret_path).unwrap();

        let public = read_base64_file(&public_path).unwrap();
        let secret = read_base64_file(&secret_path).unwrap();
        assert_eq!(public.len(), PUBLIC_KEY_LEN);
        assert_eq!(secret.len(), SECRET_KEY_LEN);
    }

    #[test]
    #[cfg(unix)]
    fn test_secret_key_file_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let public_path = temp_dir.path().join("key.pub");
        let secret_path = temp_dir.path().join("key.sec");

        generate_keypair_files(&public_path, &secret_path).unwrap();

        let metadata = fs::metadata(&secret_path).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let public_path = temp_dir.path().join("key.pub");
        let secret_path = temp_dir.path().join("key.sec");
        let plain_path = temp_dir.path().join("plain.txt");
        let sealed_path = temp_dir.path().join("sealed.b64");
        let opened_path = temp_dir.path().join("opened.txt");

        let plaintext = b"my-super-secret-token-12345";
        fs::write(&plain_path, plaintext).unwrap();

        generate_keypair_files(&public_path, &secret_path).unwrap();
        seal_file(&plain_path, &public_path, &sealed_path).unwrap();
        open_file(&sealed_path, &public_path, &secret_path, &opened_path).unwrap();

        let opened = fs::read(&opened_path).unwrap();
        assert_eq!(opened, plaintext);

        // The sealed file holds base64 of plaintext + fixed overhead
        let sealed = read_base64_file(&sealed_path).unwrap();
        assert_eq!(sealed.len(), plaintext.len() + SEAL_OVERHEAD);
    }

    #[test]
    fn test_open_with_wrong_keypair_fails() {
        let temp_dir = TempDir::new().unwrap();
        let public_path = temp_dir.path().join("key.pub");
        let secret_path = temp_dir.path().join("key.sec");
        let other_public = temp_dir.path().join("other.pub");
        let other_secret = temp_dir.path().join("other.sec");
        let plain_path = temp_dir.path().join("plain.txt");
        let sealed_path = temp_dir.path().join("sealed.b64");
        let opened_path = temp_dir.path().join("opened.txt");

        fs::write(&plain_path, b"secret").unwrap();
        generate_keypair_files(&public_path, &secret_path).unwrap();
        generate_keypair_files(&other_public, &other_secret).unwrap();

        seal_file(&plain_path, &public_path, &sealed_path).unwrap();
        let result = open_file(&sealed_path, &other_public, &other_secret, &opened_path);

        let err = result.expect_err("expected decryption failure");
        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
        assert!(!opened_path.exists());
    }

    #[test]
    fn test_open_garbage_base64_fails() {
        let temp_dir = TempDir::new().unwrap();
        let public_path = temp_dir.path().join("key.pub");
        let secret_path = temp_dir.path().join("key.sec");
        let sealed_path = temp_dir.path().join("sealed.b64");
        let opened_path = temp_dir.path().join("opened.txt");

        generate_keypair_files(&public_path, &secret_path).unwrap();
        fs::write(&sealed_path, "not valid base64!!\n").unwrap();

        let result = open_file(&sealed_path, &public_path, &secret_path, &opened_path);

        let err = result.expect_err("expected encoding failure");
        assert_eq!(err.kind, Some(ErrorKind::InvalidEncoding));
    }

    #[test]
    fn test_seal_with_truncated_public_key_fails() {
        let temp_dir = TempDir::new().unwrap();
        let public_path = temp_dir.path().join("key.pub");
        let plain_path = temp_dir.path().join("plain.txt");
        let sealed_path = temp_dir.path().join("sealed.b64");

        fs::write(&plain_path, b"secret").unwrap();
        // 16 bytes instead of 32
        fs::write(&public_path, format!("{}\n", crate::b64::encode(&[0u8; 16]))).unwrap();

        let result = seal_file(&plain_path, &public_path, &sealed_path);

        let err = result.expect_err("expected key length failure");
        assert_eq!(err.kind, Some(ErrorKind::InvalidKeyLength));
        assert!(!sealed_path.exists());
    }

    #[test]
    fn test_seal_missing_input_fails() {
        let temp_dir = TempDir::new().unwrap();
        let public_path = temp_dir.path().join("key.pub");
        let secret_path = temp_dir.path().join("key.sec");
        let sealed_path = temp_dir.path().join("sealed.b64");

        generate_keypair_files(&public_path, &secret_path).unwrap();
        let result = seal_file(
            &temp_dir.path().join("nonexistent.txt"),
            &public_path,
            &sealed_path,
        );

        let err = result.expect_err("expected read failure");
        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let public_path = temp_dir.path().join("key.pub");
        let secret_path = temp_dir.path().join("key.sec");
        let plain_path = temp_dir.path().join("empty.txt");
        let sealed_path = temp_dir.path().join("sealed.b64");
        let opened_path = temp_dir.path().join("opened.txt");

        fs::write(&plain_path, b"").unwrap();
        generate_keypair_files(&public_path, &secret_path).unwrap();
        seal_file(&plain_path, &public_path, &sealed_path).unwrap();
        open_file(&sealed_path, &public_path, &secret_path, &opened_path).unwrap();

        assert_eq!(fs::read(&opened_path).unwrap(), b"");
    }

    #[test]
    fn test_key_file_tolerates_surrounding_whitespace() {
        let temp_dir = TempDir::new().unwrap();
        let public_path = temp_dir.path().join("key.pub");
        let secret_path = temp_dir.path().join("key.sec");
        let plain_path = temp_dir.path().join("plain.txt");
        let sealed_path = temp_dir.path().join("sealed.b64");

        fs::write(&plain_path, b"secret").unwrap();
        generate_keypair_files(&public_path, &secret_path).unwrap();

        // Re-write the public key with extra whitespace around it
        let contents = fs::read_to_string(&public_path).unwrap();
        fs::write(&public_path, format!("  {}\n\n", contents.trim())).unwrap();

        seal_file(&plain_path, &public_path, &sealed_path).unwrap();
        assert!(sealed_path.exists());
    }
}
