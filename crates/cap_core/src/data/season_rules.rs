//! Season rule table
//!
//! Per-year budget, charge, allocation-money and roster constants. The
//! default table is embedded at compile time with `include_str!` and parsed
//! once; a replacement table can be loaded from a file, either explicitly or
//! through the `CAP_SEASON_RULES_PATH` environment variable.

use crate::error::{CapError, Result};
use crate::models::Money;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Env var pointing at a rule table JSON file that replaces the embedded one.
pub const SEASON_RULES_ENV: &str = "CAP_SEASON_RULES_PATH";

/// Embedded rule table (compile-time).
pub const SEASON_RULES_JSON: &str = include_str!("../../../../data/season_rules.json");

static EMBEDDED_TABLE: OnceLock<SeasonRuleTable> = OnceLock::new();

/// Charge window in which TAM may be spent on a player:
/// `min_exclusive < raw charge <= max_inclusive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChargeRange {
    pub min_exclusive: Money,
    pub max_inclusive: Money,
}

impl ChargeRange {
    pub fn contains(&self, charge: Money) -> bool {
        charge > self.min_exclusive && charge <= self.max_inclusive
    }
}

/// Constants for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeasonRules {
    pub year: u16,
    pub salary_budget: Money,
    /// Ceiling for every non-exempt senior charge after buydown.
    pub max_individual_charge: Money,
    pub dp_charge: Money,
    pub young_dp_charge: Money,
    pub young_dp_max_age: u8,
    pub u22_charge: Money,
    pub u22_max_age_at_signing: u8,
    pub u22_max_salary: Money,
    pub senior_min_charge: Money,
    pub reserve_min_charge: Money,
    pub tam_annual: Money,
    pub gam_annual: Money,
    pub tam_eligible_charge_range: ChargeRange,
    pub max_senior_roster_size: u16,
    pub max_supplemental_roster_size: u16,
    pub max_international_slots: u16,
    pub max_dp_slots: u16,
    pub max_u22_slots: u16,
}

impl SeasonRules {
    pub fn validate(&self) -> Result<()> {
        let money_fields = [
            ("salary_budget", self.salary_budget),
            ("max_individual_charge", self.max_individual_charge),
            ("dp_charge", self.dp_charge),
            ("young_dp_charge", self.young_dp_charge),
            ("u22_charge", self.u22_charge),
            ("u22_max_salary", self.u22_max_salary),
            ("senior_min_charge", self.senior_min_charge),
            ("reserve_min_charge", self.reserve_min_charge),
            ("tam_annual", self.tam_annual),
            ("gam_annual", self.gam_annual),
            ("tam_eligible_charge_range.min_exclusive", self.tam_eligible_charge_range.min_exclusive),
            ("tam_eligible_charge_range.max_inclusive", self.tam_eligible_charge_range.max_inclusive),
        ];
        for (field, value) in money_fields {
            if value.is_negative() {
                return Err(self.invalid(format!("{field} is negative ({value})")));
            }
        }
        if self.tam_eligible_charge_range.min_exclusive
            >= self.tam_eligible_charge_range.max_inclusive
        {
            return Err(self.invalid("TAM charge range is empty".to_string()));
        }
        if self.young_dp_charge > self.dp_charge {
            return Err(self.invalid(format!(
                "young DP charge {} exceeds DP charge {}",
                self.young_dp_charge, self.dp_charge
            )));
        }
        if self.max_individual_charge > self.salary_budget {
            return Err(self.invalid(format!(
                "max individual charge {} exceeds salary budget {}",
                self.max_individual_charge, self.salary_budget
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> CapError {
        CapError::InvalidRules { year: self.year, reason }
    }
}

#[derive(Debug, Deserialize)]
struct RuleTableFile {
    #[serde(default)]
    schema_version: Option<u8>,
    seasons: Vec<SeasonRules>,
}

/// All known seasons, sorted by year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRuleTable {
    seasons: Vec<SeasonRules>,
}

impl SeasonRuleTable {
    pub fn new(mut seasons: Vec<SeasonRules>) -> Result<Self> {
        if seasons.is_empty() {
            return Err(CapError::RuleTableParse("rule table has no seasons".to_string()));
        }
        seasons.sort_by_key(|s| s.year);
        for pair in seasons.windows(2) {
            if pair[0].year == pair[1].year {
                return Err(CapError::InvalidRules {
                    year: pair[0].year,
                    reason: "season listed more than once".to_string(),
                });
            }
        }
        for season in &seasons {
            season.validate()?;
        }
        Ok(SeasonRuleTable { seasons })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: RuleTableFile =
            serde_json::from_str(json).map_err(|e| CapError::RuleTableParse(e.to_string()))?;
        if let Some(version) = file.schema_version {
            if version != 1 {
                return Err(CapError::RuleTableParse(format!(
                    "unsupported rule table schema version {version}"
                )));
            }
        }
        Self::new(file.seasons)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CapError::RuleTableIo(format!("{}: {e}", path.display())))?;
        let table = Self::from_json_str(&content)?;
        info!(path = %path.display(), seasons = table.seasons.len(), "loaded season rule table");
        Ok(table)
    }

    /// The compiled-in table.
    ///
    /// # Panics
    ///
    /// Panics if the embedded JSON is malformed, which a normal build rules out.
    pub fn embedded() -> &'static SeasonRuleTable {
        EMBEDDED_TABLE.get_or_init(|| {
            SeasonRuleTable::from_json_str(SEASON_RULES_JSON)
                .expect("Embedded season_rules.json is corrupted")
        })
    }

    /// Table from `CAP_SEASON_RULES_PATH` when set, else the embedded one.
    pub fn from_env_or_embedded() -> Result<SeasonRuleTable> {
        match env::var(SEASON_RULES_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_path(Path::new(path.trim())),
            _ => {
                debug!("{SEASON_RULES_ENV} not set; using embedded rule table");
                Ok(Self::embedded().clone())
            }
        }
    }

    pub fn get(&self, year: u16) -> Result<&SeasonRules> {
        self.seasons.iter().find(|s| s.year == year).ok_or_else(|| CapError::UnknownSeason {
            year,
            available: self.years().iter().map(|y| y.to_string()).collect::<Vec<_>>().join(", "),
        })
    }

    pub fn latest(&self) -> &SeasonRules {
        // `new` rejects empty tables.
        &self.seasons[self.seasons.len() - 1]
    }

    /// Rules for `year`, or the latest season when no year is given.
    pub fn resolve(&self, year: Option<u16>) -> Result<&SeasonRules> {
        match year {
            Some(year) => self.get(year),
            None => Ok(self.latest()),
        }
    }

    pub fn years(&self) -> Vec<u16> {
        self.seasons.iter().map(|s| s.year).collect()
    }

    pub fn seasons(&self) -> &[SeasonRules] {
        &self.seasons
    }
}
