use crate::error::ConfigurationError;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn default_mongodb_uri() -> String {
    env::var("MONGODB_URI").unwrap_or("mongodb://localhost:27017".to_string())
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("StudySphereDB".to_string())
}

fn default_jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or("studysphere-dev-secret".to_string())
}

fn default_stripe_secret_key() -> String {
    env::var("STRIPE_SECRET_KEY").unwrap_or_default()
}

fn default_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000)
}

fn default_allowed_origins() -> Vec<String> {
    match env::var("ALLOWED_ORIGINS") {
        Ok(list) => list.split(',').map(|o| o.trim().to_string()).collect(),
        Err(_) => vec![String::from("http://localhost:5173")],
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,

    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_stripe_secret_key")]
    pub stripe_secret_key: String,

    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            jwt_secret: default_jwt_secret(),
            stripe_secret_key: default_stripe_secret_key(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    /// Loads settings from `$CONFIG_DIR/settings.yml`, falling back to
    /// environment variables for any field the file doesn't provide.
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = ["settings.yml", "settings.yaml"]
            .iter()
            .map(|name| config_dir().join(name))
            .find(|p| Path::exists(p))
            .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(config_file)?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_fall_back_to_defaults() {
        let config: Config = serde_yaml::from_str("{}").expect("empty mapping should parse");

        assert_eq!(config.mongodb_db, default_mongodb_db());
        assert_eq!(config.port, default_port());
        assert!(!config.allowed_origins.is_empty());
    }

    #[test]
    fn partial_settings_keep_provided_values() {
        let config: Config =
            serde_yaml::from_str("mongodb_db: test_db\nport: 8080").expect("should parse");

        assert_eq!(config.mongodb_db, "test_db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.mongodb_uri, default_mongodb_uri());
    }
}
