pub mod commands;
pub mod render;

pub use commands::{
    can_sign_player, check_roster_compliance, command_schemas, compute_sale_gam,
    execute_command_json, get_cap_rules, ApiError, ApiResponse, CanSignArgs, CheckRosterArgs,
    Command, CommandSchema, GetCapRulesArgs, RosterCompliance, SaleGamArgs, SCHEMA_VERSION,
};
pub use render::{render_compliance, render_rules, render_sale, render_verdict};
