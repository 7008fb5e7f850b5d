//! Vault Cipher - CLI
//!
//! Stand-in for the File Vault screen: reads a file, seals or opens it, and
//! writes the result next to it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use tracing_subscriber::EnvFilter;

use vault_cipher::{CipherConfig, CipherEnvelope, CipherService};

/// Environment variable checked before prompting
const PASSPHRASE_ENV: &str = "VAULT_CIPHER_PASSPHRASE";

/// Extension appended to encrypted files
const VAULT_EXT: &str = "vault";

#[derive(Parser)]
#[command(name = "vault-cipher")]
#[command(version = vault_cipher::VERSION)]
#[command(about = "File Vault encryption - passphrase-sealed document envelopes")]
struct Cli {
    /// Config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file
    Encrypt {
        /// Plaintext file
        input: PathBuf,

        /// Output path (default: <input>.vault)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write base64 text instead of binary
        #[arg(long)]
        armor: bool,

        /// Associated data bound into the tag (e.g. the file name)
        #[arg(long)]
        aad: Option<String>,
    },

    /// Decrypt a file
    Decrypt {
        /// Envelope file
        input: PathBuf,

        /// Output path (default: <input> without .vault, or <input>.out)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input is base64 text
        #[arg(long)]
        armor: bool,

        /// Associated data given at encryption
        #[arg(long)]
        aad: Option<String>,
    },

    /// Show envelope header without decrypting
    Inspect {
        /// Envelope file
        input: PathBuf,

        /// Input is base64 text
        #[arg(long)]
        armor: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vault_cipher={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CipherConfig::load_or_default(cli.config.as_deref())
        .context("failed to load config")?;
    let service = CipherService::with_config(config)?;

    match cli.command {
        Commands::Encrypt {
            input,
            output,
            armor,
            aad,
        } => {
            let plaintext = zeroize::Zeroizing::new(
                fs::read(&input).with_context(|| format!("failed to read {}", input.display()))?,
            );
            let passphrase = read_passphrase(true)?;

            let envelope = service.encrypt_with_aad(
                &plaintext,
                &passphrase,
                aad.as_deref().unwrap_or_default().as_bytes(),
            )?;

            let data = if armor {
                envelope.to_armored().into_bytes()
            } else {
                envelope.to_bytes()
            };

            let output = output.unwrap_or_else(|| encrypted_path(&input));
            write_atomic(&output, &data)?;
            tracing::info!(path = %output.display(), bytes = data.len(), "wrote envelope");
            println!("Encrypted: {}", output.display());
        }

        Commands::Decrypt {
            input,
            output,
            armor,
            aad,
        } => {
            let envelope = read_envelope(&input, armor)?;
            let passphrase = read_passphrase(false)?;

            let plaintext = match service.decrypt_with_aad(
                &envelope,
                &passphrase,
                aad.as_deref().unwrap_or_default().as_bytes(),
            ) {
                Ok(plaintext) => plaintext,
                Err(e) if e.is_authentication_failure() => {
                    bail!("incorrect passphrase or corrupted file")
                }
                Err(e) => return Err(e.into()),
            };

            let output = output.unwrap_or_else(|| decrypted_path(&input));
            write_atomic(&output, &plaintext)?;
            println!("Decrypted: {}", output.display());
        }

        Commands::Inspect { input, armor } => {
            let envelope = read_envelope(&input, armor)?;

            println!("Envelope:    {}", input.display());
            println!("{:-<40}", "");
            println!("Version:     {:#04x}", envelope.version());
            println!("Cipher:      {}", envelope.cipher().name());
            println!("Salt:        {}", hex::encode(envelope.salt()));
            println!("Nonce:       {}", hex::encode(envelope.nonce()));
            println!("Ciphertext:  {} bytes", envelope.ciphertext().len());
            println!("Total:       {} bytes", envelope.len());
        }
    }

    Ok(())
}

fn read_envelope(path: &Path, armor: bool) -> anyhow::Result<CipherEnvelope> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let envelope = if armor {
        let text = String::from_utf8(data).context("armored input is not UTF-8")?;
        CipherEnvelope::from_armored(&text)?
    } else {
        CipherEnvelope::from_bytes(&data)?
    };

    Ok(envelope)
}

fn read_passphrase(confirm: bool) -> anyhow::Result<SecretString> {
    if let Ok(value) = std::env::var(PASSPHRASE_ENV) {
        return Ok(SecretString::from(value));
    }

    let passphrase = SecretString::from(
        rpassword::prompt_password("Passphrase: ").context("failed to read passphrase")?,
    );

    if confirm {
        let again = SecretString::from(
            rpassword::prompt_password("Confirm passphrase: ")
                .context("failed to read passphrase")?,
        );
        if passphrase.expose_secret() != again.expose_secret() {
            bail!("passphrases do not match");
        }
    }

    Ok(passphrase)
}

fn encrypted_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(VAULT_EXT);
    PathBuf::from(name)
}

fn decrypted_path(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|ext| ext == VAULT_EXT) {
        input.with_extension("")
    } else {
        let mut name = input.as_os_str().to_owned();
        name.push(".out");
        PathBuf::from(name)
    }
}

/// Write to a temp file, then rename over the target
fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .with_context(|| format!("failed to create {}", temp_path.display()))?;

    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
