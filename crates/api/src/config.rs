use std::path::PathBuf;

/// Deployment environment, read from `NODE_ENV`.
///
/// Anything other than `development` or `test` (including an unset
/// variable) is treated as production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("development") => Self::Development,
            Some("test") => Self::Test,
            _ => Self::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Settings for the external automation service.
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// Base URL workflow paths are appended to. `None` disables triggers.
    pub webhook_base_url: Option<String>,
    /// Shared secret sent as, and expected in, `X-Webhook-Secret`.
    pub callback_secret: Option<String>,
    /// Public URL of this service, used to build the callback URL.
    pub app_url: String,
}

impl AutomationConfig {
    /// Where the automation service reports stage results.
    pub fn callback_url(&self) -> String {
        format!("{}/api/n8n/callback", self.app_url)
    }
}

/// Settings for the local blob store.
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Directory blobs are written under.
    pub root_dir: PathBuf,
    /// Public URL prefix that maps onto `root_dir`.
    pub public_base_url: String,
}

/// Everything the server reads from its environment, resolved once at
/// startup. Defaults target a local development checkout.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Per-request deadline; slower requests get a 408.
    pub request_timeout_secs: u64,
    /// Grace period for in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// SQLite connection string.
    pub database_url: String,
    /// Largest accepted request body, in bytes (multipart uploads included).
    pub max_upload_bytes: usize,
    pub environment: Environment,
    pub automation: AutomationConfig,
    pub blob: BlobConfig,
}

impl ServerConfig {
    /// Read the configuration, falling back to these defaults:
    ///
    /// | Env Var                | Default                                   |
    /// |------------------------|-------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                 |
    /// | `PORT`                 | `3000`                                    |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`                   |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                                      |
    /// | `DATABASE_URL`         | `sqlite://data/content-engine.db?mode=rwc`|
    /// | `MAX_UPLOAD_BYTES`     | `209715200` (200 MiB)                     |
    /// | `NODE_ENV`             | production                                |
    /// | `N8N_WEBHOOK_BASE_URL` | unset (triggers disabled)                 |
    /// | `N8N_CALLBACK_SECRET`  | unset                                     |
    /// | `NEXT_PUBLIC_APP_URL`  | `http://localhost:3000`                   |
    /// | `BLOB_STORAGE_DIR`     | `data/blobs`                              |
    /// | `BLOB_PUBLIC_BASE_URL` | `{NEXT_PUBLIC_APP_URL}/blobs`             |
    pub fn from_env() -> Self {
        let host = non_empty_env("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_env("PORT", 3000u16);

        let cors_origins = non_empty_env("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", 30u64);
        let shutdown_timeout_secs = parse_env("SHUTDOWN_TIMEOUT_SECS", 30u64);

        let database_url = non_empty_env("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://data/content-engine.db?mode=rwc".into());

        let max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", 200 * 1024 * 1024usize);

        let environment = Environment::from_node_env(std::env::var("NODE_ENV").ok().as_deref());

        let app_url = non_empty_env("NEXT_PUBLIC_APP_URL")
            .map(|url| trim_base_url(&url))
            .unwrap_or_else(|| "http://localhost:3000".into());

        let automation = AutomationConfig {
            webhook_base_url: non_empty_env("N8N_WEBHOOK_BASE_URL").map(|url| trim_base_url(&url)),
            callback_secret: non_empty_env("N8N_CALLBACK_SECRET"),
            app_url: app_url.clone(),
        };

        let blob = BlobConfig {
            root_dir: std::env::var("BLOB_STORAGE_DIR")
                .unwrap_or_else(|_| "data/blobs".into())
                .into(),
            public_base_url: non_empty_env("BLOB_PUBLIC_BASE_URL")
                .map(|url| trim_base_url(&url))
                .unwrap_or_else(|| format!("{app_url}/blobs")),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            max_upload_bytes,
            environment,
            automation,
            blob,
        }
    }
}

/// Read an env var, treating an empty or whitespace-only value as unset.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a numeric env var, using `default` when it is unset.
///
/// Panics on a malformed value so a typo fails at startup.
fn parse_env<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_env(key) {
        Some(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid number, got '{raw}': {e}")),
        None => default,
    }
}

/// Strip trailing slashes so paths can be appended with `format!`.
pub fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
