//! sjcl: encrypt and decrypt SJCL-compatible envelopes from the command line
//!
//! Commands:
//!   encrypt       - read plaintext, print an envelope as JSON
//!   decrypt       - read envelope JSON, write the plaintext bytes
//!   inspect       - validate an envelope and show its parameters (no passphrase)
//!   config show   - display the effective configuration
//!
//! Input and output default to stdin/stdout; `-` selects them explicitly.
//! Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::{ExposeSecret, SecretString};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use sjcl_core::config::SjclConfig;
use sjcl_crypto::{EncryptOptions, Envelope, KeySize, Mode, Passphrase};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sjcl",
    version,
    about = "SJCL-compatible envelope encryption",
    long_about = "sjcl: produce and open password-encrypted envelopes interchangeable with sjcl.encrypt / sjcl.decrypt"
)]
struct Cli {
    /// Path to sjcl.toml configuration file
    #[arg(long, short = 'c', env = "SJCL_CONFIG", default_value = "sjcl.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides [log] level
    #[arg(long, env = "SJCL_LOG")]
    log: Option<String>,

    /// Log format; overrides [log] format
    #[arg(long, env = "SJCL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt plaintext into an envelope
    Encrypt {
        /// AES mode (default from [codec] mode)
        #[arg(long, value_parser = parse_mode)]
        mode: Option<Mode>,
        /// PBKDF2 iteration count (default from [codec] iterations)
        #[arg(long)]
        iter: Option<u32>,
        /// Key size in bits, 128 or 256 (default from [codec] key_size)
        #[arg(long, value_parser = parse_key_size)]
        key_size: Option<KeySize>,
        /// Plaintext file, or - for stdin
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Envelope destination, or - for stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Pretty-print the envelope JSON
        #[arg(long)]
        pretty: bool,
        /// Environment variable holding the passphrase
        #[arg(long, default_value = "SJCL_PASSPHRASE")]
        passphrase_env: String,
    },

    /// Decrypt an envelope and write the plaintext
    Decrypt {
        /// Envelope JSON file, or - for stdin
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Plaintext destination, or - for stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Environment variable holding the passphrase
        #[arg(long, default_value = "SJCL_PASSPHRASE")]
        passphrase_env: String,
    },

    /// Validate an envelope and print its parameters
    Inspect {
        /// Envelope JSON file, or - for stdin
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Debug, ValueEnum, PartialEq)]
enum LogFormat {
    Json,
    Text,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse().map_err(|e: sjcl_crypto::SjclError| e.to_string())
}

fn parse_key_size(s: &str) -> Result<KeySize, String> {
    let bits: u32 = s.parse().map_err(|_| format!("not a number: {s}"))?;
    KeySize::from_bits(bits).map_err(|e| e.to_string())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config)?;
    let config = loaded.clone().unwrap_or_default();

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = match cli.log_format.clone() {
        Some(format) => format,
        None => parse_log_format(&config.log.format)?,
    };
    init_logging(&level, &format);

    if loaded.is_none() {
        warn!(path = %cli.config.display(), "config file not found, using defaults");
    }
    debug!(version = env!("CARGO_PKG_VERSION"), "sjcl starting");

    match cli.command {
        Commands::Encrypt {
            mode,
            iter,
            key_size,
            input,
            output,
            pretty,
            passphrase_env,
        } => {
            let mut options = EncryptOptions::try_from(&config.codec)?;
            if let Some(mode) = mode {
                options.mode = mode;
            }
            if let Some(iter) = iter {
                options.iterations = iter;
            }
            if let Some(key_size) = key_size {
                options.key_size = key_size;
            }
            cmd_encrypt(
                &options,
                input.as_deref(),
                output.as_deref(),
                pretty,
                &passphrase_env,
            )
        }
        Commands::Decrypt {
            input,
            output,
            passphrase_env,
        } => cmd_decrypt(input.as_deref(), output.as_deref(), &passphrase_env),
        Commands::Inspect { input } => cmd_inspect(input.as_deref()),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config, loaded.is_some()),
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn parse_log_format(s: &str) -> Result<LogFormat> {
    LogFormat::from_str(s, true)
        .map_err(|_| anyhow::anyhow!("invalid [log] format '{s}': expected json or text"))
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Returns `None` when no file exists at `path`.
fn load_config(path: &Path) -> Result<Option<SjclConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config: {}", path.display()))?;
    let config = SjclConfig::from_toml_str(&content)
        .with_context(|| format!("parsing config: {}", path.display()))?;
    Ok(Some(config))
}

// ── I/O helpers ───────────────────────────────────────────────────────────────

fn is_stdio(path: Option<&Path>) -> bool {
    path.map_or(true, |p| p == Path::new("-"))
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(p) if !is_stdio(Some(p)) => {
            std::fs::read(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(p) if !is_stdio(Some(p)) => {
            std::fs::write(p, data).with_context(|| format!("writing {}", p.display()))
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data).context("writing stdout")?;
            stdout.flush().context("flushing stdout")
        }
    }
}

fn read_envelope(path: Option<&Path>) -> Result<Envelope> {
    let raw = read_input(path)?;
    Envelope::from_slice(&raw).context("parsing envelope JSON")
}

// ── Passphrase ────────────────────────────────────────────────────────────────

/// Take the passphrase from `env_var` if set, otherwise prompt on the TTY.
fn resolve_passphrase(env_var: &str, confirm: bool) -> Result<Passphrase> {
    if let Ok(value) = std::env::var(env_var) {
        debug!(var = env_var, "passphrase taken from environment");
        let secret = SecretString::from(value);
        return Ok(Passphrase::from(&secret));
    }

    let first = SecretString::from(
        rpassword::prompt_password("Passphrase: ").context("reading passphrase")?,
    );
    if confirm {
        let second = SecretString::from(
            rpassword::prompt_password("Confirm passphrase: ").context("reading passphrase")?,
        );
        if first.expose_secret() != second.expose_secret() {
            anyhow::bail!("passphrases do not match");
        }
    }
    Ok(Passphrase::from(&first))
}

// ── `sjcl encrypt` ────────────────────────────────────────────────────────────

fn cmd_encrypt(
    options: &EncryptOptions,
    input: Option<&Path>,
    output: Option<&Path>,
    pretty: bool,
    passphrase_env: &str,
) -> Result<()> {
    let plaintext = read_input(input)?;
    let passphrase = resolve_passphrase(passphrase_env, true)?;
    let rendered = encrypt_to_json(&plaintext, &passphrase, options, pretty)?;
    write_output(output, rendered.as_bytes())?;

    info!(
        mode = %options.mode,
        key_bits = options.key_size.bits(),
        iterations = options.iterations,
        bytes = plaintext.len(),
        "encrypted"
    );
    Ok(())
}

fn encrypt_to_json(
    plaintext: &[u8],
    passphrase: &Passphrase,
    options: &EncryptOptions,
    pretty: bool,
) -> Result<String> {
    let envelope =
        sjcl_crypto::encrypt(plaintext, passphrase, options).context("encrypting input")?;
    let mut rendered = if pretty {
        envelope.to_json_pretty()?
    } else {
        envelope.to_json()?
    };
    rendered.push('\n');
    Ok(rendered)
}

// ── `sjcl decrypt` ────────────────────────────────────────────────────────────

fn cmd_decrypt(input: Option<&Path>, output: Option<&Path>, passphrase_env: &str) -> Result<()> {
    let envelope = read_envelope(input)?;

    // Reject unsupported envelopes before asking for a passphrase
    let validated = envelope.validate().context("invalid envelope")?;
    let passphrase = resolve_passphrase(passphrase_env, false)?;

    let plaintext = sjcl_crypto::decrypt_validated(&validated, &passphrase)
        .context("decryption failed")?;
    write_output(output, &plaintext)?;

    info!(
        mode = %validated.mode(),
        bytes = plaintext.len(),
        "decrypted"
    );
    Ok(())
}

// ── `sjcl inspect` ────────────────────────────────────────────────────────────

fn cmd_inspect(input: Option<&Path>) -> Result<()> {
    let envelope = read_envelope(input)?;
    print!("{}", describe_envelope(&envelope)?);
    Ok(())
}

fn describe_envelope(envelope: &Envelope) -> Result<String> {
    let validated = envelope.validate().context("invalid envelope")?;
    let mut out = String::new();
    out.push_str(&format!("mode:        {}\n", validated.mode()));
    out.push_str(&format!("key size:    {} bits\n", validated.key_size().bits()));
    out.push_str(&format!("tag size:    {} bits\n", validated.tag_bits()));
    out.push_str(&format!("iterations:  {}\n", validated.iterations()));
    out.push_str(&format!(
        "payload:     {}\n",
        fmt_bytes(validated.payload_len() as u64)
    ));
    if let Some(l) = validated.ccm_l() {
        out.push_str(&format!("ccm L:       {l} (nonce {} bytes)\n", 15 - l));
    }
    Ok(out)
}

// ── `sjcl config show` ────────────────────────────────────────────────────────

fn cmd_config_show(config: &SjclConfig, config_path: &Path, from_file: bool) -> Result<()> {
    if from_file {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!(
            "# Configuration: defaults (no file at {})",
            config_path.display()
        );
    }
    println!();
    let rendered = config
        .to_toml_string()
        .context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── Utilities ─────────────────────────────────────────────────────────────────

fn fmt_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}
