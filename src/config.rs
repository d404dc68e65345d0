//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the service persists: the SQLite
//! database and the uploads directory. Resolution priority:
//! 1. `TUNEDEX_ROOT` environment variable
//! 2. `root_folder` key in `~/.config/tunedex/config.toml`
//! 3. OS-dependent default data directory

use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5727;

/// Resolved process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Resolve configuration from environment and config file
    pub fn resolve() -> Self {
        let root_folder = resolve_root_folder();

        let host = std::env::var("TUNEDEX_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("TUNEDEX_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            root_folder,
            host,
            port,
        }
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("tunedex.db")
    }

    /// Directory holding uploaded file bytes
    pub fn uploads_dir(&self) -> PathBuf {
        self.root_folder.join("uploads")
    }

    /// Create the root folder and uploads directory if missing
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.uploads_dir())?;
        Ok(())
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn resolve_root_folder() -> PathBuf {
    // Priority 1: Environment variable
    if let Ok(path) = std::env::var("TUNEDEX_ROOT") {
        return PathBuf::from(path);
    }

    // Priority 2: TOML config file
    if let Some(path) = root_folder_from_config_file() {
        return path;
    }

    // Priority 3: OS-dependent default
    default_root_folder()
}

fn root_folder_from_config_file() -> Option<PathBuf> {
    let config_path = dirs::config_dir()?.join("tunedex").join("config.toml");
    let content = std::fs::read_to_string(&config_path).ok()?;
    let config = toml::from_str::<toml::Value>(&content).ok()?;
    config
        .get("root_folder")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunedex"))
        .unwrap_or_else(|| PathBuf::from("./tunedex_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_and_uploads_live_under_root() {
        let config = AppConfig {
            root_folder: PathBuf::from("/tmp/tunedex-test"),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        };

        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/tunedex-test/tunedex.db")
        );
        assert_eq!(
            config.uploads_dir(),
            PathBuf::from("/tmp/tunedex-test/uploads")
        );
        assert_eq!(config.bind_address(), "127.0.0.1:5727");
    }
}
