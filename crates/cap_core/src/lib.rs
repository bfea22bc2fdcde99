//! # cap_core - Deterministic Salary-Cap Compliance Engine
//!
//! Evaluates a roster against a season's salary-cap rules: per-player budget
//! charges, roster and slot limits, TAM/GAM buydowns, signing feasibility and
//! GAM generated by outgoing sales.
//!
//! ## Features
//! - Integer-cent money, no floating point in any rule calculation
//! - Season rules embedded at compile time, overridable from a file
//! - Same roster and rules always produce the same result
//! - JSON command API with schemas and text renderings

pub mod api;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;

pub use api::{
    can_sign_player, check_roster_compliance, command_schemas, compute_sale_gam,
    execute_command_json, get_cap_rules, Command,
};
pub use data::{SeasonRuleTable, SeasonRules};
pub use engine::{
    auto_allocate, charge_of, check_roster, evaluate_roster, evaluate_signing, gam_from_sale,
    AllocationState, ComplianceReport, Issue, IssueKind, PoolKind, RosterState,
    SigningCandidate, SigningDesignation, SigningVerdict,
};
pub use error::{CapError, Result};
pub use models::{Money, Player, PlayerRecord, RosterSlot};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
