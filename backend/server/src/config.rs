use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Database,
    Snapshot,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Database => "database",
            DataSource::Snapshot => "snapshot",
        }
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "mysql" | "sql" => Ok(DataSource::Database),
            "snapshot" | "json" => Ok(DataSource::Snapshot),
            other => Err(format!("unknown data source '{other}'")),
        }
    }
}

impl Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_source: DataSource,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_max_connections: u32,
    pub snapshot_dir: PathBuf,
    pub snapshot_url: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", 3000),
            data_source: try_load("DATA_SOURCE", DataSource::Snapshot),
            db_host: try_load("DB_HOST", "localhost".to_string()),
            db_port: try_load("DB_PORT", 3306),
            db_user: try_load("DB_USER", "root".to_string()),
            db_password: var("DB_PASSWORD")
                .or_else(|_| read_secret("DB_PASSWORD"))
                .unwrap_or_default(),
            db_name: try_load("DB_NAME", "restaurant_map".to_string()),
            db_max_connections: try_load("DB_MAX_CONNECTIONS", 10),
            snapshot_dir: var("SNAPSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            snapshot_url: var("SNAPSHOT_URL").ok().filter(|url| !url.is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            data_source: DataSource::Snapshot,
            db_host: "localhost".to_string(),
            db_port: 3306,
            db_user: "root".to_string(),
            db_password: String::new(),
            db_name: "restaurant_map".to_string(),
            db_max_connections: 10,
            snapshot_dir: PathBuf::from("data"),
            snapshot_url: None,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found");
    })
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(raw) = var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    parse_or(key, &raw, default)
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
        default
    })
}

fn read_secret(secret_name: &str) -> Result<String, ()> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path).map(|s| s.trim().to_string()).map_err(|e| {
        info!("No {secret_name} secret at {path}: {e}");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_aliases() {
        assert_eq!("mysql".parse::<DataSource>(), Ok(DataSource::Database));
        assert_eq!(" SQL ".parse::<DataSource>(), Ok(DataSource::Database));
        assert_eq!("json".parse::<DataSource>(), Ok(DataSource::Snapshot));
        assert!("redis".parse::<DataSource>().is_err());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        assert_eq!(parse_or("PORT", "not-a-port", 3000u16), 3000);
        assert_eq!(parse_or("PORT", "70000", 3000u16), 3000);
        assert_eq!(parse_or("PORT", " 8080 ", 3000u16), 8080);
        assert_eq!(
            parse_or("DATA_SOURCE", "carrier pigeon", DataSource::Snapshot),
            DataSource::Snapshot
        );
    }
}
