//! capcheck library
//!
//! File loading and output formatting behind the `capcheck` binary.

use anyhow::{bail, Context, Result};
use cap_core::data::SeasonRuleTable;
use cap_core::models::PlayerRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Rule table from `--rules`, else `CAP_SEASON_RULES_PATH`, else the
/// embedded table.
pub fn load_rules(path: Option<&Path>) -> Result<SeasonRuleTable> {
    let table = match path {
        Some(path) => SeasonRuleTable::from_path(path)
            .with_context(|| format!("Failed to load season rules: {}", path.display()))?,
        None => SeasonRuleTable::from_env_or_embedded().context("Failed to load season rules")?,
    };
    info!(years = ?table.years(), "season rules ready");
    Ok(table)
}

/// Roster files are either a bare array of players or an object with a
/// `players` array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RosterFile {
    Players(Vec<PlayerRecord>),
    Wrapped { players: Vec<PlayerRecord> },
}

pub fn read_roster(path: &Path) -> Result<Vec<PlayerRecord>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
    let roster: RosterFile = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse roster file: {}", path.display()))?;
    let players = match roster {
        RosterFile::Players(players) | RosterFile::Wrapped { players } => players,
    };
    info!(count = players.len(), path = %path.display(), "roster loaded");
    Ok(players)
}

/// Raw JSON arguments for `capcheck exec`, inline or `@file`.
pub fn read_args(raw: &str) -> Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read arguments file: {path}")),
        None => Ok(raw.to_string()),
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize result")
}

/// Parse a dollar amount as typed on the command line: `1200000`,
/// `1,200,000`, `$1.2M`, `750k`.
pub fn parse_dollars(input: &str) -> Result<f64> {
    let cleaned: String =
        input.trim().trim_start_matches('$').chars().filter(|c| *c != ',' && *c != '_').collect();
    let (digits, scale) = match cleaned.chars().last() {
        Some('k' | 'K') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('m' | 'M') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    let value: f64 = digits.parse().with_context(|| format!("Invalid dollar amount: {input}"))?;
    if !value.is_finite() || value < 0.0 {
        bail!("Invalid dollar amount: {input}");
    }
    Ok(value * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_roster_accepts_both_shapes() -> Result<()> {
        let player = serde_json::json!({
            "id": "p1",
            "guaranteed_compensation": 900000,
            "designation": "Senior",
            "age_at_acquisition": 27
        });

        let mut bare = NamedTempFile::new()?;
        bare.write_all(serde_json::json!([player]).to_string().as_bytes())?;
        assert_eq!(read_roster(bare.path())?.len(), 1);

        let mut wrapped = NamedTempFile::new()?;
        wrapped.write_all(serde_json::json!({ "players": [player, player] }).to_string().as_bytes())?;
        assert_eq!(read_roster(wrapped.path())?.len(), 2);

        Ok(())
    }

    #[test]
    fn test_read_roster_reports_path_on_error() -> Result<()> {
        let mut broken = NamedTempFile::new()?;
        broken.write_all(b"{\"players\": 7}")?;

        let err = read_roster(broken.path()).unwrap_err();
        assert!(format!("{err}").contains("Failed to parse roster file"));
        Ok(())
    }

    #[test]
    fn test_load_rules_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(cap_core::data::SEASON_RULES_JSON.as_bytes())?;

        let table = load_rules(Some(file.path()))?;
        assert_eq!(table.years(), vec![2024, 2025, 2026]);
        Ok(())
    }

    #[test]
    fn test_read_args_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"{\"year\": 2025}")?;

        let inline = read_args("{\"year\": 2024}")?;
        assert_eq!(inline, "{\"year\": 2024}");
        let from_file = read_args(&format!("@{}", file.path().display()))?;
        assert_eq!(from_file, "{\"year\": 2025}");
        Ok(())
    }

    #[test]
    fn test_parse_dollars() {
        assert_eq!(parse_dollars("1200000").unwrap(), 1_200_000.0);
        assert_eq!(parse_dollars("$1,200,000").unwrap(), 1_200_000.0);
        assert_eq!(parse_dollars("750k").unwrap(), 750_000.0);
        assert_eq!(parse_dollars("$1.5M").unwrap(), 1_500_000.0);
        assert!(parse_dollars("lots").is_err());
        assert!(parse_dollars("-5").is_err());
    }
}
