//! Rule data
//!
//! Per-season cap constants, embedded in the binary and optionally replaced
//! from a file at runtime.

pub mod season_rules;

pub use season_rules::{
    ChargeRange, SeasonRuleTable, SeasonRules, SEASON_RULES_ENV, SEASON_RULES_JSON,
};
