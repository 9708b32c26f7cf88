use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::listing::{Column, SortOrder};

const DEFAULT_SSH_PORT: u16 = 22;

/// Browser settings loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Column the listing is sorted by when the browser starts.
    pub sort_column: Option<Column>,
    pub sort_order: SortOrder,
    /// Re-apply the active sort after every listing refresh.
    pub resort_on_refresh: bool,
    /// Request/reply channel capacity (`None` means unbounded).
    pub channel_capacity: Option<usize>,
    pub sftp: Option<SftpConfig>,
}

impl BrowserConfig {
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let input = fs::read_to_string(path).map_err(ConfigError::from)?;
        Ok(Self::from_json(&input)?)
    }
}

/// Connection settings for the SFTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SftpConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub auth: SftpAuth,
}

impl SftpConfig {
    /// `<host>:<port>` pair to connect to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication used after the SSH agent has been tried.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SftpAuth {
    Password {
        password: String,
    },
    KeyFile {
        private_key_path: String,
        #[serde(default)]
        passphrase: Option<String>,
    },
}

impl Default for SftpAuth {
    fn default() -> Self {
        Self::Password {
            password: String::new(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{BrowserConfig, SftpAuth};
    use crate::error::{BrowserError, ConfigError};
    use crate::listing::{Column, SortOrder};

    #[test]
    fn given_empty_object_when_parsed_then_defaults_are_used() {
        let config =
            BrowserConfig::from_json("{}").expect("config should parse");

        assert_eq!(config, BrowserConfig::default());
        assert_eq!(config.sort_order, SortOrder::Ascending);
    }

    #[test]
    fn given_full_config_when_parsed_then_fields_are_read() {
        let config = BrowserConfig::from_json(
            r#"{
                "sort_column": "size",
                "sort_order": "descending",
                "resort_on_refresh": true,
                "channel_capacity": 64,
                "sftp": {
                    "host": "example.org",
                    "user": "otty",
                    "auth": {
                        "type": "key_file",
                        "private_key_path": "/home/otty/.ssh/id_ed25519"
                    }
                }
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.sort_column, Some(Column::Size));
        assert_eq!(config.sort_order, SortOrder::Descending);
        assert!(config.resort_on_refresh);
        assert_eq!(config.channel_capacity, Some(64));
        let sftp = config.sftp.expect("sftp section should be present");
        assert_eq!(sftp.address(), "example.org:22");
        assert_eq!(
            sftp.auth,
            SftpAuth::KeyFile {
                private_key_path: String::from("/home/otty/.ssh/id_ed25519"),
                passphrase: None,
            }
        );
    }

    #[test]
    fn given_invalid_json_when_parsed_then_parse_error_is_returned() {
        assert!(matches!(
            BrowserConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn given_missing_file_when_loaded_then_config_io_error_is_returned() {
        let result = BrowserConfig::load(Path::new(
            "/nonexistent/otty-remote-fs/config.json",
        ));

        assert!(matches!(
            result,
            Err(BrowserError::Config(ConfigError::Io(_)))
        ));
    }
}
