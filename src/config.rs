use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path of the catalog CSV loaded at startup
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Path of the append-only feedback CSV
    #[serde(default = "default_feedback_path")]
    pub feedback_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound applied to the requested recommendation count
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

fn default_catalog_path() -> String {
    "data/anime.csv".to_string()
}

fn default_feedback_path() -> String {
    "data/feedback.csv".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_recommendations() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            feedback_path: default_feedback_path(),
            host: default_host(),
            port: default_port(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
