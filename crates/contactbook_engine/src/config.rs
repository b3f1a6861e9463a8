use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use contactbook_base::pal::http::HttpServerConfig;
use contactbook_base::{ContactbookError, ContactbookResult, PalHandle, ResultExt};

use crate::api::CORS_HEADERS;

/// Default name of the configuration file, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "contactbook.toml";

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "CONTACTBOOK_DATABASE";

/// Server configuration.
///
/// Every field is optional in the file; omitted fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Path of the SQLite database file.
    pub database: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database: PathBuf::from("contacts.db"),
        }
    }
}

impl Config {
    /// Apply environment overrides, read through `lookup`.
    ///
    /// Empty or blank values count as unset. An unparsable `PORT` is an error
    /// rather than silently ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> ContactbookResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port.trim().parse().map_err(|_| {
                Box::new(ContactbookError::validation(format!(
                    "{} must be a port number, got {:?}",
                    PORT_ENV, port
                )))
            })?;
            debug!(port = self.port, "port overridden from environment");
        }
        if let Some(database) = lookup(DATABASE_ENV) {
            self.database = PathBuf::from(database);
            debug!(database = %self.database.display(), "database overridden from environment");
        }
        Ok(self)
    }

    /// The HTTP server settings derived from this configuration.
    ///
    /// The CORS headers go on every reply, including the ones the server produces
    /// without reaching the API service.
    pub fn server_config(&self) -> HttpServerConfig {
        CORS_HEADERS.iter().fold(
            HttpServerConfig::new(self.host.clone()).with_port(self.port),
            |config, (key, value)| config.with_default_header(*key, *value),
        )
    }
}

/// Load the configuration file at `path`. A missing file yields the defaults.
pub fn load_config(pal: &PalHandle, path: &Path) -> ContactbookResult<Config> {
    if !pal.file_exists(path)? {
        info!(path = %path.display(), "no configuration file, using defaults");
        return Ok(Config::default());
    }

    let text = pal
        .read_file_to_string(path)
        .with_context(|| format!("reading configuration {}", path.display()))?;
    toml::from_str(&text).map_err(|e| {
        Box::new(ContactbookError::validation(format!(
            "Invalid configuration in {}: {}",
            path.display(),
            e
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactbook_base::MockPal;
    use expect_test::expect;

    fn pal_with(content: &str) -> PalHandle {
        let mock = MockPal::new();
        mock.add_file(CONFIG_FILE_NAME, content.as_bytes().to_vec());
        PalHandle::new(mock)
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let pal = PalHandle::new(MockPal::new());
        let config = load_config(&pal, Path::new(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server_config().address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let pal = pal_with("port = 8080\n");
        let config = load_config(&pal, Path::new(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database, PathBuf::from("contacts.db"));
    }

    #[test]
    fn test_full_file() {
        let pal = pal_with(
            r#"
host = "127.0.0.1"
port = 4000
database = "data/book.db"
"#,
        );
        let config = load_config(&pal, Path::new(CONFIG_FILE_NAME)).unwrap();
        expect![[r#"
            Config {
                host: "127.0.0.1",
                port: 4000,
                database: "data/book.db",
            }
        "#]]
        .assert_debug_eq(&config);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let pal = pal_with("colour = \"blue\"\n");
        let error = load_config(&pal, Path::new(CONFIG_FILE_NAME)).unwrap_err();
        assert!(error.to_string().contains("Invalid configuration"), "{}", error);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_env_overrides(|key| match key {
                "PORT" => Some("5050".to_string()),
                "CONTACTBOOK_DATABASE" => Some("/tmp/other.db".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.port, 5050);
        assert_eq!(config.database, PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_no_env_keeps_values() {
        let config = Config::default().with_env_overrides(|_| None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_blank_env_values_count_as_unset() {
        for blank in ["", "   "] {
            let config = Config::default()
                .with_env_overrides(|_| Some(blank.to_string()))
                .unwrap();
            assert_eq!(config, Config::default(), "{:?}", blank);
        }
    }

    #[test]
    fn test_server_config_carries_cors_headers() {
        let server = Config::default().server_config();
        assert_eq!(server.address(), "0.0.0.0:3000");
        assert_eq!(
            server.default_headers,
            CORS_HEADERS
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_invalid_port_env_is_an_error() {
        let error = Config::default()
            .with_env_overrides(|key| (key == "PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(error.to_string().contains("PORT must be a port number"), "{}", error);
    }
}
