use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Backing medium for the translation cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Filesystem,
    Sled,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "filesystem" | "fs" | "file" => Ok(StoreBackend::Filesystem),
            "sled" => Ok(StoreBackend::Sled),
            "memory" | "moka" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Filesystem => "filesystem",
            StoreBackend::Sled => "sled",
            StoreBackend::Memory => "memory",
        }
    }
}

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub cache_backend: StoreBackend,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub cache_max_entries: Option<u64>,
    pub cleanup_interval: Duration,
    pub translate_timeout: Duration,
    pub google_api_key: Option<String>,
    pub google_endpoint: String,
    pub site_id: Option<String>,
    pub network_id: Option<String>,
    pub default_language: String,
    pub languages: Vec<String>,
    pub menu_catalog_path: Option<PathBuf>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_CACHE_DIR: &str = "./data/lingua-cache";
    const DEFAULT_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
    const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 24 * 60 * 60;
    const DEFAULT_TRANSLATE_TIMEOUT_MS: u64 = 10_000;
    const DEFAULT_GOOGLE_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";
    const DEFAULT_LANGUAGE: &str = "en";
    const DEFAULT_LANGUAGES: &str = "en,ru,th,zh,hi";

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let number = |name: &str, default: u64| {
            non_empty(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let cache_backend = match non_empty("LINGUA_CACHE_BACKEND") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}, falling back to filesystem", e);
                StoreBackend::Filesystem
            }),
            None => StoreBackend::Filesystem,
        };

        let default_language =
            non_empty("LINGUA_DEFAULT_LANGUAGE").unwrap_or_else(|| Self::DEFAULT_LANGUAGE.to_string());

        let languages = non_empty("LINGUA_LANGUAGES")
            .unwrap_or_else(|| Self::DEFAULT_LANGUAGES.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: non_empty("LINGUA_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port: non_empty("LINGUA_HTTP_PORT")
                .and_then(|v| v.trim().parse::<u16>().ok())
                .unwrap_or(Self::DEFAULT_HTTP_PORT),
            cache_backend,
            cache_dir: non_empty("LINGUA_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CACHE_DIR)),
            cache_ttl: Duration::from_secs(number(
                "LINGUA_CACHE_TTL_SECS",
                Self::DEFAULT_CACHE_TTL_SECS,
            )),
            cache_max_entries: non_empty("LINGUA_CACHE_MAX_ENTRIES")
                .and_then(|v| v.trim().parse::<u64>().ok()),
            cleanup_interval: Duration::from_secs(
                number(
                    "LINGUA_CLEANUP_INTERVAL_SECS",
                    Self::DEFAULT_CLEANUP_INTERVAL_SECS,
                )
                .max(1),
            ),
            translate_timeout: Duration::from_millis(number(
                "LINGUA_TRANSLATE_TIMEOUT_MS",
                Self::DEFAULT_TRANSLATE_TIMEOUT_MS,
            )),
            google_api_key: non_empty("LINGUA_GOOGLE_API_KEY"),
            google_endpoint: non_empty("LINGUA_GOOGLE_ENDPOINT")
                .unwrap_or_else(|| Self::DEFAULT_GOOGLE_ENDPOINT.to_string()),
            site_id: lookup("LINGUA_SITE_ID"),
            network_id: lookup("LINGUA_NETWORK_ID"),
            default_language,
            languages,
            menu_catalog_path: non_empty("LINGUA_MENU_CATALOG").map(PathBuf::from),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}
