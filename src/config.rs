use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL that share links are built on, e.g. `https://x.io/`.
    pub base_link: String,
    /// Fixed namespace segment prepended to every generated key, e.g. `s/`.
    pub key_prefix: String,
    /// Object-store endpoint as `host:port`, without a scheme.
    pub s3_endpoint: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub s3_tls: bool,
    pub s3_bucket: String,
    pub s3_region: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "File-sharing gateway over S3-compatible object storage")]
pub struct Args {
    /// Host to bind to (overrides SHARELINK_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides SHARELINK_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Public base URL for share links (overrides SHARELINK_BASE_LINK)
    #[arg(long)]
    pub base_link: Option<String>,

    /// Prefix prepended to generated object keys (overrides SHARELINK_KEY_PREFIX)
    #[arg(long)]
    pub key_prefix: Option<String>,

    /// Object-store endpoint, host:port (overrides SHARELINK_S3_ENDPOINT)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// Object-store access key (overrides SHARELINK_S3_ACCESS_KEY)
    #[arg(long)]
    pub s3_access_key: Option<String>,

    /// Object-store secret key (overrides SHARELINK_S3_SECRET_KEY)
    #[arg(long)]
    pub s3_secret_key: Option<String>,

    /// Connect to the object store over TLS (overrides SHARELINK_S3_TLS)
    #[arg(long)]
    pub s3_tls: Option<bool>,

    /// Bucket objects are stored in (overrides SHARELINK_S3_BUCKET)
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// Bucket region (overrides SHARELINK_S3_REGION)
    #[arg(long)]
    pub s3_region: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("SHARELINK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("SHARELINK_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing SHARELINK_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading SHARELINK_PORT"),
        };
        let env_base_link =
            env::var("SHARELINK_BASE_LINK").unwrap_or_else(|_| "http://localhost:3000/".into());
        let env_prefix = env::var("SHARELINK_KEY_PREFIX").unwrap_or_else(|_| "s/".into());
        let env_endpoint =
            env::var("SHARELINK_S3_ENDPOINT").unwrap_or_else(|_| "localhost:9000".into());
        let env_tls = match env::var("SHARELINK_S3_TLS") {
            Ok(value) => Some(
                value
                    .parse::<bool>()
                    .with_context(|| format!("parsing SHARELINK_S3_TLS value `{}`", value))?,
            ),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading SHARELINK_S3_TLS"),
        };
        let env_bucket = env::var("SHARELINK_S3_BUCKET").unwrap_or_else(|_| "sharelink".into());
        let env_region = env::var("SHARELINK_S3_REGION").unwrap_or_else(|_| "us-east-1".into());

        // Credentials have no sensible default; missing credentials are a
        // startup failure, not a runtime one.
        let access_key = args
            .s3_access_key
            .or_else(|| env::var("SHARELINK_S3_ACCESS_KEY").ok())
            .context("object-store access key must be set via --s3-access-key or SHARELINK_S3_ACCESS_KEY")?;
        let secret_key = args
            .s3_secret_key
            .or_else(|| env::var("SHARELINK_S3_SECRET_KEY").ok())
            .context("object-store secret key must be set via --s3-secret-key or SHARELINK_S3_SECRET_KEY")?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            base_link: args.base_link.unwrap_or(env_base_link),
            key_prefix: args.key_prefix.unwrap_or(env_prefix),
            s3_endpoint: args.s3_endpoint.unwrap_or(env_endpoint),
            s3_access_key: access_key,
            s3_secret_key: secret_key,
            s3_tls: args.s3_tls.or(env_tls).unwrap_or(false),
            s3_bucket: args.s3_bucket.unwrap_or(env_bucket),
            s3_region: args.s3_region.unwrap_or(env_region),
        };

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Scheme-qualified endpoint URL for the object-store client.
    pub fn s3_endpoint_url(&self) -> String {
        let scheme = if self.s3_tls { "https" } else { "http" };
        format!("{}://{}", scheme, self.s3_endpoint)
    }
}
