//! Config version stamping and migration checks.
//!
//! The config file carries `config_version = "X.Y.Z"` as its first line.
//! On startup the stamped version is compared against the binary's version
//! to decide whether setup needs to rewrite the config.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::path::Path;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A parsed major.minor.patch version.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion(u32, u32, u32);

impl SemanticVersion {
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let parts: Vec<u32> = version_str
            .trim()
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| anyhow!("Invalid version component: '{part}'"))
            })
            .collect::<Result<_, _>>()?;

        match parts.as_slice() {
            [major, minor, patch] => Ok(SemanticVersion(*major, *minor, *patch)),
            _ => Err(anyhow!(
                "Invalid version format: '{}'. Expected 'major.minor.patch'",
                version_str
            )),
        }
    }
}

/// Reads the `config_version` stamp from the first line of the config file.
fn config_version_of(config_path: &Path) -> anyhow::Result<Option<String>> {
    let content = std::fs::read_to_string(config_path)?;
    let first_line = content.lines().next().unwrap_or_default();

    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(regex
        .captures(first_line)
        .map(|caps| caps[1].to_string()))
}

/// Determines if setup is needed.
///
/// Setup is needed when the config file is missing, carries no version
/// stamp (legacy config), or is stamped with an older version. Returns a
/// description of the version being migrated from, or `None` when the
/// config is current.
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<Option<String>> {
    if !config_path.exists() {
        return Ok(Some("none (first run)".to_string()));
    }

    let Some(stamped) = config_version_of(config_path)? else {
        return Ok(Some("unknown (legacy config)".to_string()));
    };

    let stamped_version = SemanticVersion::parse(&stamped)?;
    let current_version = SemanticVersion::parse(CURRENT_VERSION)?;

    match stamped_version.cmp(&current_version) {
        Ordering::Less => Ok(Some(stamped)),
        Ordering::Equal => Ok(None),
        Ordering::Greater => {
            // Config written by a newer binary; don't block startup
            tracing::warn!(
                "Config version {} is newer than app version {}",
                stamped,
                CURRENT_VERSION
            );
            Ok(None)
        }
    }
}

/// Stamps the config file with the current version as its first line,
/// replacing any existing stamp and preserving all other content.
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;

    let body: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("config_version"))
        .collect();

    let stamp = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    let new_content = if body.is_empty() {
        stamp
    } else {
        format!("{}\n{}", stamp, body.join("\n"))
    };

    std::fs::write(config_path, new_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_component_versions() {
        assert_eq!(
            SemanticVersion::parse("0.1.0").unwrap(),
            SemanticVersion(0, 1, 0)
        );
        assert_eq!(
            SemanticVersion::parse(" 2.10.3 ").unwrap(),
            SemanticVersion(2, 10, 3)
        );
    }

    #[test]
    fn orders_versions_numerically() {
        let old = SemanticVersion::parse("0.0.9").unwrap();
        let new = SemanticVersion::parse("0.1.0").unwrap();
        let newer = SemanticVersion::parse("1.0.0").unwrap();

        assert!(old < new);
        assert!(new < newer);
    }

    #[test]
    fn rejects_malformed_versions() {
        assert!(SemanticVersion::parse("0.1").is_err());
        assert!(SemanticVersion::parse("0.1.0.1").is_err());
        assert!(SemanticVersion::parse("one.two.three").is_err());
    }
}
