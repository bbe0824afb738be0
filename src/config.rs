use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub expiry: ExpiryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_local_path")]
    pub local_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpiryConfig {
    /// Files older than this many seconds are removed by the sweeper.
    #[serde(default = "default_lifetime_secs")]
    pub lifetime_secs: u64,
    /// How often the sweeper scans the storage directory.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_local_path() -> String {
    "data/uploads".to_string()
}

fn default_lifetime_secs() -> u64 {
    60 * 60 // 1 hour
}

fn default_sweep_interval_secs() -> u64 {
    10 * 60 // 10 minutes
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_path: default_local_path(),
        }
    }
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            lifetime_secs: default_lifetime_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            expiry: ExpiryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        Ok(config)
    }

    pub fn file_lifetime(&self) -> Duration {
        Duration::from_secs(self.expiry.lifetime_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.expiry.sweep_interval_secs)
    }

    /// Load configuration from conf.ini or config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["conf.ini", "config.toml", "data/conf.ini", "data/config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: LD_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("LD_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("LD_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        // Storage overrides
        if let Ok(val) = env::var("LD_CONF_STORAGE_LOCAL_PATH") {
            self.storage.local_path = val;
        }

        // Expiry overrides
        if let Ok(val) = env::var("LD_CONF_EXPIRY_LIFETIME") {
            if let Ok(secs) = val.parse() {
                self.expiry.lifetime_secs = secs;
            }
        }
        if let Ok(val) = env::var("LD_CONF_EXPIRY_SWEEP_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.expiry.sweep_interval_secs = secs;
            }
        }
    }

    /// Ensure the storage directory exists
    fn ensure_directories(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.storage.local_path)?;
        Ok(())
    }
}
