//! Configuration parsing and validation.
//!
//! Loads the warehouse connection, S3 source locations, and IAM role from a
//! YAML file, with environment variable interpolation for anything secret.
//! Values that end up spliced into COPY statements are validated here, before
//! any statement is generated.

mod vars;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::path::Path;

use crate::error::{
    ConfigError, EnvInterpolationSnafu, InvalidIamArnSnafu, InvalidLocationSnafu,
    MissingValueSnafu, ReadFileSnafu, UnsafeValueSnafu, YamlParseSnafu,
};

/// Main configuration for an ETL run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Warehouse connection settings.
    pub warehouse: WarehouseConfig,
    /// S3 source locations for the bulk loader.
    pub s3: S3Config,
    /// IAM role the bulk loader authenticates with.
    pub iam_role: IamRoleConfig,
}

/// Warehouse (Redshift cluster) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Cluster endpoint hostname.
    pub host: String,

    /// Cluster port (default: 5439).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name.
    pub dbname: String,

    /// Database user.
    pub user: String,

    /// Database password. Usually supplied via `${DWH_PASSWORD}`.
    pub password: String,
}

fn default_port() -> u16 {
    5439
}

/// S3 source locations consumed by the COPY statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Prefix for event-log JSON objects.
    /// Example: "s3://udacity-dend/log_data"
    pub log_data: String,

    /// JSONPaths document describing the event JSON field layout.
    /// Example: "s3://udacity-dend/log_json_path.json"
    pub log_jsonpath: String,

    /// Prefix for song-metadata JSON objects.
    /// Example: "s3://udacity-dend/song_data"
    pub song_data: String,

    /// Region the source bucket lives in (default: "us-west-2").
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "us-west-2".to_string()
}

/// IAM role used by the bulk loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IamRoleConfig {
    /// Role ARN, e.g. "arn:aws:iam::123456789012:role/dwhRole".
    pub arn: String,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_with_options(path, true)
    }

    /// Load configuration from a YAML file with optional environment variable
    /// interpolation.
    pub fn from_file_with_options(
        path: impl AsRef<Path>,
        interpolate_env: bool,
    ) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).context(ReadFileSnafu)?;

        let content = if interpolate_env {
            vars::interpolate(&content).map_err(|errors| {
                EnvInterpolationSnafu {
                    message: errors.join("\n"),
                }
                .build()
            })?
        } else {
            content
        };

        let config: Config = serde_yaml::from_str(&content).context(YamlParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// COPY options cannot be bound as query parameters, so every value that
    /// gets spliced into a COPY statement is checked here instead: locations
    /// must be s3:// URLs, the ARN must have a role-ARN shape, and nothing
    /// may contain a quote or control character.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(!self.warehouse.host.is_empty(), MissingValueSnafu { key: "warehouse.host" });
        ensure!(
            !self.warehouse.dbname.is_empty(),
            MissingValueSnafu { key: "warehouse.dbname" }
        );
        ensure!(!self.warehouse.user.is_empty(), MissingValueSnafu { key: "warehouse.user" });
        ensure!(
            !self.warehouse.password.is_empty(),
            MissingValueSnafu { key: "warehouse.password" }
        );
        ensure!(!self.s3.region.is_empty(), MissingValueSnafu { key: "s3.region" });

        check_location("s3.log_data", &self.s3.log_data)?;
        check_location("s3.log_jsonpath", &self.s3.log_jsonpath)?;
        check_location("s3.song_data", &self.s3.song_data)?;

        ensure!(!self.iam_role.arn.is_empty(), MissingValueSnafu { key: "iam_role.arn" });
        ensure!(
            is_role_arn(&self.iam_role.arn),
            InvalidIamArnSnafu {
                value: self.iam_role.arn.clone()
            }
        );

        check_literal_safe("iam_role.arn", &self.iam_role.arn)?;
        check_literal_safe("s3.region", &self.s3.region)?;

        Ok(())
    }
}

fn check_location(key: &'static str, value: &str) -> Result<(), ConfigError> {
    ensure!(!value.is_empty(), MissingValueSnafu { key });
    ensure!(
        value.starts_with("s3://"),
        InvalidLocationSnafu {
            key,
            value: value.to_string()
        }
    );
    check_literal_safe(key, value)
}

/// Reject values that cannot be safely embedded in a single-quoted SQL
/// literal. Escaping would also work, but a quote inside an S3 prefix or an
/// ARN is never legitimate, so rejection gives a clearer failure.
fn check_literal_safe(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let unsafe_char = value
        .chars()
        .any(|c| c == '\'' || c == '\\' || c.is_control());
    ensure!(
        !unsafe_char,
        UnsafeValueSnafu {
            key,
            value: value.to_string()
        }
    );
    Ok(())
}

fn is_role_arn(value: &str) -> bool {
    value.starts_with("arn:") && value.contains(":iam::") && value.contains(":role/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            warehouse: WarehouseConfig {
                host: "dwhcluster.example.us-west-2.redshift.amazonaws.com".to_string(),
                port: 5439,
                dbname: "dwh".to_string(),
                user: "dwhuser".to_string(),
                password: "Passw0rd".to_string(),
            },
            s3: S3Config {
                log_data: "s3://udacity-dend/log_data".to_string(),
                log_jsonpath: "s3://udacity-dend/log_json_path.json".to_string(),
                song_data: "s3://udacity-dend/song_data".to_string(),
                region: "us-west-2".to_string(),
            },
            iam_role: IamRoleConfig {
                arn: "arn:aws:iam::123456789012:role/dwhRole".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        valid_config().validate().unwrap();
    }

    #[test]
    fn test_config_yaml_parsing() {
        let yaml = r#"
warehouse:
  host: "dwhcluster.example.us-west-2.redshift.amazonaws.com"
  dbname: dwh
  user: dwhuser
  password: Passw0rd

s3:
  log_data: "s3://udacity-dend/log_data"
  log_jsonpath: "s3://udacity-dend/log_json_path.json"
  song_data: "s3://udacity-dend/song_data"

iam_role:
  arn: "arn:aws:iam::123456789012:role/dwhRole"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();

        // Defaults
        assert_eq!(config.warehouse.port, 5439);
        assert_eq!(config.s3.region, "us-west-2");
    }

    #[test]
    fn test_missing_key_fails_parse() {
        let yaml = r#"
warehouse:
  host: "example"
  dbname: dwh
  user: dwhuser
  password: pw

s3:
  log_data: "s3://bucket/log_data"
  song_data: "s3://bucket/song_data"

iam_role:
  arn: "arn:aws:iam::123456789012:role/dwhRole"
"#;
        // log_jsonpath absent
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_empty_value_rejected() {
        let mut config = valid_config();
        config.warehouse.password = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingValue {
                key: "warehouse.password"
            })
        ));
    }

    #[test]
    fn test_non_s3_location_rejected() {
        let mut config = valid_config();
        config.s3.song_data = "https://example.com/songs".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLocation {
                key: "s3.song_data",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_arn_rejected() {
        let mut config = valid_config();
        config.iam_role.arn = "dwhRole".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidIamArn { .. })
        ));
    }

    #[test]
    fn test_quote_in_location_rejected() {
        let mut config = valid_config();
        config.s3.log_data = "s3://bucket/log'; DROP TABLE users; --".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsafeValue {
                key: "s3.log_data",
                ..
            })
        ));
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
warehouse:
  host: "dwhcluster.example.us-west-2.redshift.amazonaws.com"
  dbname: dwh
  user: dwhuser
  password: Passw0rd

s3:
  log_data: "s3://udacity-dend/log_data"
  log_jsonpath: "s3://udacity-dend/log_json_path.json"
  song_data: "s3://udacity-dend/song_data"
  region: eu-west-1

iam_role:
  arn: "arn:aws:iam::123456789012:role/dwhRole"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.s3.region, "eu-west-1");
    }
}
