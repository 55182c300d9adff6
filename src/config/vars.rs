//! Environment variable interpolation for config files.
//!
//! Credentials and bucket names belong in the environment, not in a config
//! file checked into a repo. Supported syntax:
//! - `${VAR}` - substitute with the env var value, error if missing
//! - `${VAR:-default}` - use the default if VAR is unset or empty
//! - `$$` - escape sequence for a literal `$`
//!
//! Unbraced `$VAR` is deliberately not supported; S3 prefixes and ARNs are
//! full of `$`-adjacent punctuation and bare variables are easy to fat-finger.

use regex::Regex;
use std::env;
use std::sync::LazyLock;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$\$                              # literal $
        |
        \$\{
            (?P<name>[A-Za-z_][A-Za-z0-9_]*)
            (?: :- (?P<default>[^}]*) )?
        \}
        ",
    )
    .expect("invalid interpolation regex")
});

/// Interpolate environment variables in `input`.
///
/// All missing variables are accumulated so the user sees every problem in
/// one pass rather than fixing them one at a time.
pub fn interpolate(input: &str) -> Result<String, Vec<String>> {
    let mut errors = Vec::new();

    let text = VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            if &caps[0] == "$$" {
                return "$".to_string();
            }

            let name = &caps["name"];
            let default = caps.name("default").map(|m| m.as_str());

            match env::var(name) {
                Ok(value) if value.contains('\n') || value.contains('\r') => {
                    errors.push(format!(
                        "environment variable '{name}' contains newlines, which is not allowed"
                    ));
                    caps[0].to_string()
                }
                Ok(value) if value.is_empty() && default.is_some() => {
                    default.unwrap_or("").to_string()
                }
                Ok(value) => value,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        errors.push(format!("environment variable '{name}' is not set"));
                        caps[0].to_string()
                    }
                },
            }
        })
        .to_string();

    if errors.is_empty() {
        Ok(text)
    } else {
        Err(errors)
    }
}
