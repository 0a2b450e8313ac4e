use std::path::PathBuf;

/// Process configuration, read from the environment once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub assets_dir: PathBuf,
    pub db_path: PathBuf,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let assets_dir = PathBuf::from(lookup("ASSETS_DIR").unwrap_or_else(|| "assets".to_string()));
        let db_path =
            PathBuf::from(lookup("DB_PATH").unwrap_or_else(|| "data/projects.redb".to_string()));
        let port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| format!("PORT must be a port number, got {:?}", port))?,
            None => 3000,
        };
        Ok(Config {
            assets_dir,
            db_path,
            port,
        })
    }
}
