//! Command surface
//!
//! Four commands with flat key/value arguments. Each exists in a typed form
//! (`get_cap_rules`, ...) and behind a JSON dispatcher that wraps results in
//! [`ApiResponse`] together with a text rendering.

use super::render::{render_compliance, render_rules, render_sale, render_verdict};
use crate::data::{SeasonRuleTable, SeasonRules};
use crate::engine::{
    allocation_plan, check_roster, evaluate_signing, gam_from_sale, AllocationPlan,
    ComplianceReport, RequestedDesignation, RosterState, SaleAllocation, SaleTerms,
    SigningCandidate, SigningVerdict,
};
use crate::error::{CapError, Result};
use crate::models::{validate_roster, Money, PlayerRecord};
use schemars::schema::RootSchema;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{error, info};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self { code: code.to_string(), message: message.to_string() }
    }
}

impl From<&CapError> for ApiError {
    fn from(err: &CapError) -> Self {
        let code = match err {
            CapError::InvalidRequest(_) => "INVALID_JSON",
            CapError::UnknownSeason { .. } => "UNKNOWN_SEASON",
            CapError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            CapError::InvalidRules { .. } | CapError::RuleTableParse(_) | CapError::RuleTableIo(_) => {
                "RULE_TABLE_ERROR"
            }
            _ => "INVALID_INPUT",
        };
        ApiError::new(code, &err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub schema_version: u32,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, text: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            text: Some(text),
            error: None,
            schema_version: SCHEMA_VERSION,
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self { success: false, data: None, text: None, error: Some(error), schema_version: SCHEMA_VERSION }
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetCapRulesArgs {
    /// Season year; defaults to the latest season in the table.
    #[serde(default)]
    pub year: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckRosterArgs {
    #[serde(default)]
    pub year: Option<u16>,
    pub players: Vec<PlayerRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CanSignArgs {
    #[serde(default)]
    pub year: Option<u16>,
    /// Annual guaranteed compensation in dollars.
    pub salary: Money,
    pub age: u8,
    /// Cash transfer fee in dollars, amortized over the guaranteed years.
    #[serde(default)]
    pub transfer_fee: Money,
    #[serde(default)]
    pub contract_years_guaranteed: Option<u32>,
    #[serde(default)]
    pub is_international: bool,
    #[serde(default)]
    pub designation: RequestedDesignation,
    /// Current roster; an empty roster with full TAM/GAM when omitted.
    #[serde(default)]
    pub roster: Option<Vec<PlayerRecord>>,
}

impl CanSignArgs {
    pub fn new(salary: Money, age: u8) -> Self {
        CanSignArgs {
            year: None,
            salary,
            age,
            transfer_fee: Money::ZERO,
            contract_years_guaranteed: None,
            is_international: false,
            designation: RequestedDesignation::default(),
            roster: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SaleGamArgs {
    /// Gross fee received, in dollars.
    pub transfer_fee: Money,
    #[serde(default)]
    pub is_homegrown: bool,
    /// Age at sale; no young-player bonus when omitted.
    #[serde(default)]
    pub player_age: Option<u8>,
}

// ---------------------------------------------------------------------------
// Typed commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterCompliance {
    pub report: ComplianceReport,
    pub allocation: AllocationPlan,
}

pub fn get_cap_rules(table: &SeasonRuleTable, args: &GetCapRulesArgs) -> Result<SeasonRules> {
    Ok(table.resolve(args.year)?.clone())
}

pub fn check_roster_compliance(
    table: &SeasonRuleTable,
    args: CheckRosterArgs,
) -> Result<RosterCompliance> {
    let rules = table.resolve(args.year)?;
    let players = validate_roster(args.players)?;
    let (report, state) = check_roster(&players, rules);
    let allocation = allocation_plan(&players, rules, &state);
    Ok(RosterCompliance { report, allocation })
}

pub fn can_sign_player(table: &SeasonRuleTable, args: CanSignArgs) -> Result<SigningVerdict> {
    let rules = table.resolve(args.year)?;
    let roster = match args.roster {
        Some(records) => RosterState::auto(validate_roster(records)?, rules),
        None => RosterState::empty(rules),
    };
    let candidate = SigningCandidate {
        name: None,
        salary: args.salary,
        age: args.age,
        transfer_fee: args.transfer_fee,
        gam_transfer_fee: Money::ZERO,
        contract_years_guaranteed: args.contract_years_guaranteed,
        is_international: args.is_international,
        designation: Some(args.designation),
    };
    evaluate_signing(&candidate, &roster, rules)
}

pub fn compute_sale_gam(args: &SaleGamArgs) -> Result<SaleAllocation> {
    let terms = SaleTerms::default();
    let age = args.player_age.unwrap_or(terms.young_player_age_limit);
    gam_from_sale(args.transfer_fee, args.is_homegrown, age, &terms)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    GetCapRules,
    CheckRosterCompliance,
    CanSignPlayer,
    ComputeSaleGam,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::GetCapRules,
        Command::CheckRosterCompliance,
        Command::CanSignPlayer,
        Command::ComputeSaleGam,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::GetCapRules => "get_cap_rules",
            Command::CheckRosterCompliance => "check_roster_compliance",
            Command::CanSignPlayer => "can_sign_player",
            Command::ComputeSaleGam => "compute_sale_gam",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::GetCapRules => "Salary cap constants for a season",
            Command::CheckRosterCompliance => {
                "Check a roster against budget and slot limits, with the automatic TAM/GAM buydown"
            }
            Command::CanSignPlayer => {
                "Decide whether a player can be signed and under which designation"
            }
            Command::ComputeSaleGam => "GAM generated by selling a player",
        }
    }

    pub fn schema(self) -> RootSchema {
        match self {
            Command::GetCapRules => schema_for!(GetCapRulesArgs),
            Command::CheckRosterCompliance => schema_for!(CheckRosterArgs),
            Command::CanSignPlayer => schema_for!(CanSignArgs),
            Command::ComputeSaleGam => schema_for!(SaleGamArgs),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = CapError;

    fn from_str(s: &str) -> Result<Self> {
        Command::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| CapError::InvalidRequest(format!("unknown command '{s}'")))
    }
}

/// Published shape of one command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: RootSchema,
}

pub fn command_schemas() -> Vec<CommandSchema> {
    Command::ALL
        .into_iter()
        .map(|c| CommandSchema { name: c.name(), description: c.description(), parameters: c.schema() })
        .collect()
}

fn parse_args<A: DeserializeOwned>(args_json: &str) -> Result<A> {
    let trimmed = args_json.trim();
    let json = if trimmed.is_empty() { "{}" } else { trimmed };
    Ok(serde_json::from_str(json)?)
}

fn respond<T: Serialize>(result: Result<T>, render: impl FnOnce(&T) -> String) -> String {
    let response = match result {
        Ok(data) => {
            let text = render(&data);
            ApiResponse::success(data, text)
        }
        Err(e) => {
            error!("Command failed: {}", e);
            ApiResponse::error(ApiError::from(&e))
        }
    };
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

/// Run a command by name against a JSON argument object and return the
/// JSON-encoded [`ApiResponse`].
pub fn execute_command_json(table: &SeasonRuleTable, command: &str, args_json: &str) -> String {
    info!("Processing command request: {}", command);

    let command = match command.parse::<Command>() {
        Ok(c) => c,
        Err(e) => return respond::<()>(Err(e), |_| String::new()),
    };

    match command {
        Command::GetCapRules => respond(
            parse_args(args_json).and_then(|args| get_cap_rules(table, &args)),
            render_rules,
        ),
        Command::CheckRosterCompliance => respond(
            parse_args(args_json).and_then(|args| check_roster_compliance(table, args)),
            |r: &RosterCompliance| render_compliance(&r.report, &r.allocation),
        ),
        Command::CanSignPlayer => respond(
            parse_args(args_json).and_then(|args| can_sign_player(table, args)),
            render_verdict,
        ),
        Command::ComputeSaleGam => respond(
            parse_args(args_json).and_then(|args: SaleGamArgs| compute_sale_gam(&args)),
            render_sale,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn table() -> &'static SeasonRuleTable {
        SeasonRuleTable::embedded()
    }

    fn run(command: &str, args: Value) -> Value {
        let out = execute_command_json(table(), command, &args.to_string());
        serde_json::from_str(&out).unwrap()
    }

    #[test]
    fn test_get_cap_rules_defaults_to_latest() {
        let rules = get_cap_rules(table(), &GetCapRulesArgs::default()).unwrap();
        assert_eq!(rules.year, 2026);
        assert_eq!(rules.max_individual_charge, Money::from_dollars(803_125));

        let older = get_cap_rules(table(), &GetCapRulesArgs { year: Some(2024) }).unwrap();
        assert_eq!(older.year, 2024);
    }

    #[test]
    fn test_unknown_year_is_error_response() {
        let response = run("get_cap_rules", json!({ "year": 1999 }));
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "UNKNOWN_SEASON");
    }

    #[test]
    fn test_check_roster_compliance_scenario() {
        let response = run(
            "check_roster_compliance",
            json!({
                "players": [{
                    "id": "p1",
                    "guaranteed_compensation": 900000,
                    "designation": "Senior",
                    "age_at_acquisition": 27
                }]
            }),
        );

        assert_eq!(response["success"], true);
        let data = &response["data"];
        assert_eq!(data["report"]["is_compliant"], true);
        assert_eq!(data["allocation"]["lines"][0]["tam"], 96875);
        assert_eq!(data["allocation"]["lines"][0]["gam"], 0);
        assert!(response["text"].as_str().unwrap().contains("COMPLIANT"));
    }

    #[test]
    fn test_can_sign_player_defaults() {
        let verdict = can_sign_player(table(), CanSignArgs::new(Money::from_dollars(612_500), 22))
            .unwrap();
        assert!(verdict.can_sign);
        assert_eq!(verdict.final_charge, Money::from_dollars(200_000));
        assert_eq!(verdict.requested.unwrap().designation, RequestedDesignation::Senior);
    }

    #[test]
    fn test_can_sign_player_json_designation_spelling() {
        let response = run(
            "can_sign_player",
            json!({ "salary": 3000000, "age": 30, "designation": "DP" }),
        );
        assert_eq!(response["success"], true);
        assert_eq!(response["data"]["optimal_designation"], "DP");
        assert_eq!(response["data"]["final_charge"], 803125);
    }

    #[test]
    fn test_zero_years_with_fee_is_input_error() {
        let response = run(
            "can_sign_player",
            json!({
                "salary": 500000,
                "age": 25,
                "transfer_fee": 1000000,
                "contract_years_guaranteed": 0
            }),
        );
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "INVALID_INPUT");
    }

    #[test]
    fn test_huge_amounts_are_input_errors() {
        let huge = |id: &str| {
            json!({
                "id": id,
                "guaranteed_compensation": 1e17,
                "designation": "Senior",
                "age_at_acquisition": 27
            })
        };
        let response = run("check_roster_compliance", json!({ "players": [huge("a"), huge("b")] }));
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "INVALID_INPUT");

        let response = run("compute_sale_gam", json!({ "transfer_fee": 1e17 }));
        assert_eq!(response["error"]["code"], "INVALID_INPUT");
    }

    #[test]
    fn test_compute_sale_gam() {
        let sale = compute_sale_gam(&SaleGamArgs {
            transfer_fee: Money::from_dollars(5_000_000),
            is_homegrown: true,
            player_age: Some(21),
        })
        .unwrap();
        assert_eq!(sale.gam_generated, Money::from_dollars(2_015_625));

        let no_age = compute_sale_gam(&SaleGamArgs {
            transfer_fee: Money::from_dollars(5_000_000),
            is_homegrown: false,
            player_age: None,
        })
        .unwrap();
        assert!(no_age.bonuses.is_empty());
    }

    #[test]
    fn test_malformed_and_unknown_requests() {
        let out = execute_command_json(table(), "compute_sale_gam", "{not json");
        let response: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(response["error"]["code"], "INVALID_JSON");

        let response = run("trade_player", json!({}));
        assert_eq!(response["success"], false);
        assert!(response["error"]["message"].as_str().unwrap().contains("trade_player"));

        let response = run("get_cap_rules", json!({ "season": 2026 }));
        assert_eq!(response["success"], false);
    }

    #[test]
    fn test_empty_args_use_defaults() {
        let out = execute_command_json(table(), "get_cap_rules", "");
        let response: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(response["data"]["year"], 2026);
        assert_eq!(response["schema_version"], SCHEMA_VERSION);
    }

    #[test]
    fn test_command_schemas_cover_every_command() {
        let schemas = command_schemas();
        let names: Vec<&str> = schemas.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["get_cap_rules", "check_roster_compliance", "can_sign_player", "compute_sale_gam"]
        );

        let sign = serde_json::to_value(&schemas[2].parameters).unwrap();
        let required: Vec<&str> = sign["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, vec!["age", "salary"]);
        assert!(sign["properties"]["designation"].is_object());
    }

    #[test]
    fn test_schemas_accept_valid_and_reject_invalid_args() {
        let schema = serde_json::to_value(Command::CanSignPlayer.schema()).unwrap();
        let compiled = jsonschema::JSONSchema::compile(&schema).unwrap();

        assert!(compiled.is_valid(&json!({ "salary": 750000, "age": 24, "designation": "TAM" })));
        assert!(!compiled.is_valid(&json!({ "salary": 750000 })));
        assert!(!compiled.is_valid(&json!({ "salary": 750000, "age": 24, "designation": "Star" })));
    }
}
