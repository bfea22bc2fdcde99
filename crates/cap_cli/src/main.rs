//! capcheck CLI
//!
//! Salary-cap checks from the command line: season rules, roster
//! compliance, signing feasibility and sale GAM.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use cap_core::api::{self, CanSignArgs, CheckRosterArgs, GetCapRulesArgs, SaleGamArgs};
#[cfg(feature = "cli")]
use cap_core::data::SEASON_RULES_ENV;
#[cfg(feature = "cli")]
use cap_core::engine::RequestedDesignation;
#[cfg(feature = "cli")]
use cap_core::models::Money;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "capcheck")]
#[command(author, version, about = "Salary cap compliance and allocation money checks", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Season rule table to use instead of the built-in one
    #[arg(long, global = true, env = SEASON_RULES_ENV)]
    rules: Option<PathBuf>,

    /// Print the structured result as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Show the cap constants for a season
    Rules {
        /// Season year (defaults to the latest)
        #[arg(short, long)]
        year: Option<u16>,
    },

    /// Check a roster file against budget and slot limits
    Compliance {
        /// Roster JSON file (array of players or {"players": [...]})
        roster: PathBuf,

        #[arg(short, long)]
        year: Option<u16>,
    },

    /// Check whether a player can be signed
    Sign {
        /// Annual salary, e.g. 1200000, 1.2M, 750k
        #[arg(long, value_parser = capcheck_dollars)]
        salary: Money,

        /// Age at signing
        #[arg(long)]
        age: u8,

        /// Cash transfer fee
        #[arg(long, value_parser = capcheck_dollars, default_value = "0")]
        fee: Money,

        /// Guaranteed contract years the fee is spread over
        #[arg(long)]
        years: Option<u32>,

        /// Candidate uses an international slot
        #[arg(long, default_value_t = false)]
        international: bool,

        /// Requested designation (DP, TAM, U22, Senior)
        #[arg(long, value_parser = parse_designation, default_value = "Senior")]
        designation: RequestedDesignation,

        /// Current roster JSON file; empty roster when omitted
        #[arg(long)]
        roster: Option<PathBuf>,

        #[arg(short, long)]
        year: Option<u16>,
    },

    /// GAM generated by selling a player
    Sale {
        /// Gross transfer fee received
        #[arg(value_parser = capcheck_dollars)]
        fee: Money,

        /// Player is a club homegrown
        #[arg(long, default_value_t = false)]
        homegrown: bool,

        /// Age at sale
        #[arg(long)]
        age: Option<u8>,
    },

    /// Print the JSON Schemas of every command's arguments
    Schemas,

    /// Run a command with JSON arguments (inline or @file) and print the
    /// JSON response envelope
    Exec {
        /// Command name, e.g. can_sign_player
        command: String,

        #[arg(default_value = "{}")]
        args: String,
    },
}

#[cfg(feature = "cli")]
fn capcheck_dollars(input: &str) -> std::result::Result<Money, String> {
    let dollars = cap_cli::parse_dollars(input).map_err(|e| e.to_string())?;
    Money::try_from_dollars_f64(dollars)
        .ok_or_else(|| format!("amount too large: {input} (limit {} dollars)", Money::MAX_DOLLARS))
}

#[cfg(feature = "cli")]
fn parse_designation(input: &str) -> std::result::Result<RequestedDesignation, String> {
    match input.to_ascii_lowercase().as_str() {
        "dp" => Ok(RequestedDesignation::Dp),
        "tam" => Ok(RequestedDesignation::Tam),
        "u22" => Ok(RequestedDesignation::U22),
        "senior" => Ok(RequestedDesignation::Senior),
        _ => Err(format!("unknown designation '{input}' (expected DP, TAM, U22 or Senior)")),
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let table = cap_cli::load_rules(cli.rules.as_deref())?;

    let output = match cli.command {
        Commands::Rules { year } => {
            let rules = api::get_cap_rules(&table, &GetCapRulesArgs { year })?;
            if cli.json {
                cap_cli::to_json(&rules)?
            } else {
                api::render_rules(&rules)
            }
        }

        Commands::Compliance { roster, year } => {
            let players = cap_cli::read_roster(&roster)?;
            let result = api::check_roster_compliance(&table, CheckRosterArgs { year, players })
                .with_context(|| format!("Roster check failed: {}", roster.display()))?;
            if cli.json {
                cap_cli::to_json(&result)?
            } else {
                api::render_compliance(&result.report, &result.allocation)
            }
        }

        Commands::Sign { salary, age, fee, years, international, designation, roster, year } => {
            let roster = roster.as_deref().map(cap_cli::read_roster).transpose()?;
            let args = CanSignArgs {
                year,
                transfer_fee: fee,
                contract_years_guaranteed: years,
                is_international: international,
                designation,
                roster,
                ..CanSignArgs::new(salary, age)
            };
            let verdict = api::can_sign_player(&table, args).context("Signing check failed")?;
            if cli.json {
                cap_cli::to_json(&verdict)?
            } else {
                api::render_verdict(&verdict)
            }
        }

        Commands::Sale { fee, homegrown, age } => {
            let args = SaleGamArgs { transfer_fee: fee, is_homegrown: homegrown, player_age: age };
            let sale = api::compute_sale_gam(&args).context("Sale calculation failed")?;
            if cli.json {
                cap_cli::to_json(&sale)?
            } else {
                api::render_sale(&sale)
            }
        }

        Commands::Schemas => cap_cli::to_json(&api::command_schemas())?,

        Commands::Exec { command, args } => {
            let args = cap_cli::read_args(&args)?;
            api::execute_command_json(&table, &command, &args)
        }
    };

    println!("{output}");
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("capcheck CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
