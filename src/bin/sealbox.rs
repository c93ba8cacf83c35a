//! Sealbox CLI - anonymous public-key encryption
//!
//! Command-line interface for generating keypairs and sealing/opening
//! messages using NaCl sealed boxes (X25519 + XSalsa20-Poly1305). Sealed
//! messages carry no sender identity; only the recipient's secret key can
//! open them.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process;

use sealbox::file_ops;

#[derive(Parser)]
#[command(name = "sealbox")]
#[command(version)]
#[command(about = "Anonymous public-key encryption using sealed boxes.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh keypair
    #[command(alias = "k")]
    Keygen {
        /// Path to write the base64 public key to
        #[arg(long, value_name = "FILE")]
        public_key: PathBuf,

        /// Path to write the base64 secret key to (created with mode 0600)
        #[arg(long, value_name = "FILE")]
        secret_key: PathBuf,
    },

    /// Seal a file for a recipient public key
    #[command(alias = "s")]
    Seal {
        /// Path to the file whose contents is to be sealed
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the recipient's base64 public key
        #[arg(long, value_name = "FILE")]
        public_key: PathBuf,

        /// Path to the file to write the base64 sealed message to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Open a sealed file with the matching secret key
    #[command(alias = "o")]
    Open {
        /// Path to the file holding the base64 sealed message
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the recipient's base64 public key
        #[arg(long, value_name = "FILE")]
        public_key: PathBuf,

        /// Path to the recipient's base64 secret key
        #[arg(long, value_name = "FILE")]
        secret_key: PathBuf,

        /// Path to the file to write the recovered plaintext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Keygen {
            public_key,
            secret_key,
        } => file_ops::generate_keypair_files(&public_key, &secret_key).map(|()| {
            format!(
                "wrote keypair to {} and {}",
                public_key.display(),
                secret_key.display()
            )
        }),
        Commands::Seal {
            input,
            public_key,
            output,
        } => file_ops::seal_file(&input, &public_key, &output)
            .map(|()| format!("sealed {} to {}", input.display(), output.display())),
        Commands::Open {
            input,
            public_key,
            secret_key,
            output,
        } => file_ops::open_file(&input, &public_key, &secret_key, &output)
            .map(|()| format!("opened {} to {}", input.display(), output.display())),
    };

    match result {
        Ok(message) => println!("{}", message),
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut cause = e.source();
            while let Some(c) = cause {
                eprintln!("  caused by: {}", c);
                cause = c.source();
            }
            process::exit(1);
        }
    }
}
