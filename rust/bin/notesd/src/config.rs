//! Server configuration file.
//!
//! An optional TOML file provides [`ServiceConfig`] values; command-line
//! flags override whatever the file sets.
//!
//! ```toml
//! listen = "127.0.0.1:8080"
//! data_dir = "/var/lib/notes"
//! pool_size = 8
//! ```

use std::path::{Path, PathBuf};

use notes_core::ServiceConfig;

/// Command-line values that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub listen: Option<String>,
    pub sqlite_path: Option<PathBuf>,
    pub pool_size: Option<usize>,
}

/// Load the configuration file, or defaults when no path is given.
/// A path that is given but missing is an error.
pub fn load(path: Option<&Path>) -> anyhow::Result<ServiceConfig> {
    match path {
        None => Ok(ServiceConfig::default()),
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("failed to read config {}: {}", path.display(), e)
            })?;
            parse(&content)
        }
    }
}

pub fn parse(content: &str) -> anyhow::Result<ServiceConfig> {
    let config: ServiceConfig = toml::from_str(content)?;
    Ok(config)
}

/// Apply command-line overrides on top of a loaded configuration.
pub fn apply(mut config: ServiceConfig, overrides: Overrides) -> ServiceConfig {
    if let Some(listen) = overrides.listen {
        config.listen = listen;
    }
    if let Some(path) = overrides.sqlite_path {
        config.sqlite_path = Some(path);
    }
    if let Some(size) = overrides.pool_size {
        config.pool_size = size;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_gives_defaults() {
        let config = load(None).unwrap();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("notes.db"));
    }

    #[test]
    fn test_parse_partial_file() {
        let config = parse("listen = \"127.0.0.1:9090\"\ndata_dir = \"/srv/notes\"\n").unwrap();
        assert_eq!(config.listen, "127.0.0.1:9090");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("/srv/notes/notes.db"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notesd.toml");
        std::fs::write(&path, "pool_size = 2\nsqlite_path = \"/tmp/stuff.db\"\n").unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("/tmp/stuff.db"));
    }

    #[test]
    fn test_overrides_win() {
        let config = parse("listen = \"127.0.0.1:9090\"\npool_size = 2\n").unwrap();
        let config = apply(
            config,
            Overrides {
                listen: Some("0.0.0.0:1234".into()),
                sqlite_path: None,
                pool_size: Some(6),
            },
        );
        assert_eq!(config.listen, "0.0.0.0:1234");
        assert_eq!(config.pool_size, 6);
    }

    #[test]
    fn test_unknown_type_is_error() {
        assert!(parse("pool_size = \"many\"\n").is_err());
    }
}
