//! Bulk-load (COPY) statement generation.
//!
//! Redshift cannot bind COPY options as query parameters, so the S3
//! locations, IAM role, and region are spliced into the statement text.
//! `Config::validate` has already rejected anything that cannot live inside
//! a single-quoted literal; `literal` re-checks at the splice point so a
//! `Config` built by hand cannot bypass it.
//!
//! Failure semantics are the loader's: a bad path, malformed record, or
//! denied authorization fails the whole COPY, never a partial load.

use crate::config::Config;
use crate::error::{ConfigError, UnsafeValueSnafu};
use snafu::prelude::*;

/// COPY for the event-log staging table.
///
/// Events are loaded with an explicit JSONPaths document because the source
/// field names (e.g. `firstName`) don't match the staging column names.
pub fn copy_staging_events(config: &Config) -> Result<String, ConfigError> {
    Ok(format!(
        "COPY staging_events\n\
         FROM {}\n\
         CREDENTIALS 'aws_iam_role={}'\n\
         REGION {}\n\
         FORMAT AS JSON {};",
        literal("s3.log_data", &config.s3.log_data)?,
        raw("iam_role.arn", &config.iam_role.arn)?,
        literal("s3.region", &config.s3.region)?,
        literal("s3.log_jsonpath", &config.s3.log_jsonpath)?,
    ))
}

/// COPY for the song-metadata staging table.
///
/// Song documents are flat and field names already match, so `JSON 'auto'`
/// maps each top-level object to one row.
pub fn copy_staging_songs(config: &Config) -> Result<String, ConfigError> {
    Ok(format!(
        "COPY staging_songs\n\
         FROM {}\n\
         CREDENTIALS 'aws_iam_role={}'\n\
         REGION {}\n\
         JSON 'auto';",
        literal("s3.song_data", &config.s3.song_data)?,
        raw("iam_role.arn", &config.iam_role.arn)?,
        literal("s3.region", &config.s3.region)?,
    ))
}

/// Render a value as a single-quoted SQL literal, rejecting anything that
/// could escape the quotes.
fn literal(key: &'static str, value: &str) -> Result<String, ConfigError> {
    Ok(format!("'{}'", raw(key, value)?))
}

/// Check a value for splicing into an already-quoted position.
fn raw<'a>(key: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
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
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IamRoleConfig, S3Config, WarehouseConfig};

    fn config() -> Config {
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
    fn test_events_copy_shape() {
        let sql = copy_staging_events(&config()).unwrap();
        assert!(sql.starts_with("COPY staging_events"));
        assert!(sql.contains("FROM 's3://udacity-dend/log_data'"));
        assert!(sql.contains("CREDENTIALS 'aws_iam_role=arn:aws:iam::123456789012:role/dwhRole'"));
        assert!(sql.contains("REGION 'us-west-2'"));
        assert!(sql.contains("FORMAT AS JSON 's3://udacity-dend/log_json_path.json'"));
    }

    #[test]
    fn test_songs_copy_uses_auto_layout() {
        let sql = copy_staging_songs(&config()).unwrap();
        assert!(sql.starts_with("COPY staging_songs"));
        assert!(sql.contains("FROM 's3://udacity-dend/song_data'"));
        assert!(sql.contains("JSON 'auto'"));
        assert!(!sql.contains("FORMAT AS JSON 's3://"));
    }

    #[test]
    fn test_region_comes_from_config() {
        let mut config = config();
        config.s3.region = "eu-west-1".to_string();
        let sql = copy_staging_songs(&config).unwrap();
        assert!(sql.contains("REGION 'eu-west-1'"));
    }

    #[test]
    fn test_quote_injection_rejected() {
        let mut config = config();
        config.s3.log_data = "s3://bucket/x' REGION 'us-east-1".to_string();
        let err = copy_staging_events(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsafeValue {
                key: "s3.log_data",
                ..
            }
        ));
    }

    #[test]
    fn test_control_char_rejected() {
        let mut config = config();
        config.iam_role.arn = "arn:aws:iam::1:role/x\n".to_string();
        assert!(copy_staging_songs(&config).is_err());
    }
}
