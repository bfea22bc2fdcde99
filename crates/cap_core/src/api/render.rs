//! Plain-text renderings of command results for tool hosts that display
//! text rather than JSON.

use crate::data::SeasonRules;
use crate::engine::{
    AllocationPlan, BonusReason, ComplianceReport, SaleAllocation, SigningVerdict, SlotUsage,
};
use std::fmt::Write;

fn pct(bps: u32) -> String {
    if bps % 100 == 0 {
        format!("{}%", bps / 100)
    } else {
        format!("{:.2}%", bps as f64 / 100.0)
    }
}

fn slot(label: &str, usage: &SlotUsage) -> String {
    format!("  {:<22}{:>3} / {}", label, usage.used, usage.max)
}

pub fn render_rules(rules: &SeasonRules) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Salary cap rules for {}", rules.year);
    let _ = writeln!(out, "  Salary budget:         {}", rules.salary_budget);
    let _ = writeln!(out, "  Max individual charge: {}", rules.max_individual_charge);
    let _ = writeln!(out, "  DP charge:             {}", rules.dp_charge);
    let _ = writeln!(
        out,
        "  Young DP charge:       {} (age <= {})",
        rules.young_dp_charge, rules.young_dp_max_age
    );
    let _ = writeln!(
        out,
        "  U22 charge:            {} (age <= {}, salary <= {})",
        rules.u22_charge, rules.u22_max_age_at_signing, rules.u22_max_salary
    );
    let _ = writeln!(out, "  Senior minimum:        {}", rules.senior_min_charge);
    let _ = writeln!(out, "  Reserve minimum:       {}", rules.reserve_min_charge);
    let _ = writeln!(out, "  TAM:                   {}", rules.tam_annual);
    let _ = writeln!(
        out,
        "  TAM window:            above {} up to {}",
        rules.tam_eligible_charge_range.min_exclusive, rules.tam_eligible_charge_range.max_inclusive
    );
    let _ = writeln!(out, "  GAM:                   {}", rules.gam_annual);
    let _ = writeln!(
        out,
        "  Roster:                {} senior, {} supplemental",
        rules.max_senior_roster_size, rules.max_supplemental_roster_size
    );
    let _ = write!(
        out,
        "  Slots:                 {} DP, {} U22, {} international",
        rules.max_dp_slots, rules.max_u22_slots, rules.max_international_slots
    );
    out
}

pub fn render_compliance(report: &ComplianceReport, plan: &AllocationPlan) -> String {
    let mut out = String::new();
    let verdict = if report.is_compliant { "COMPLIANT" } else { "NOT COMPLIANT" };
    let _ = writeln!(out, "Roster compliance ({}): {}", report.year, verdict);
    let _ = writeln!(out, "  Total budget charge:   {}", report.total_budget_charge);
    let _ = writeln!(out, "  Cap space remaining:   {}", report.cap_space_remaining);
    let _ = writeln!(out, "{}", slot("Senior roster", &report.slots.senior_roster));
    let _ = writeln!(out, "{}", slot("Supplemental roster", &report.slots.supplemental_roster));
    let _ = writeln!(out, "{}", slot("Designated Players", &report.slots.designated_players));
    let _ = writeln!(out, "{}", slot("U22 Initiative", &report.slots.u22));
    let _ = writeln!(out, "{}", slot("International", &report.slots.international));
    let _ = writeln!(
        out,
        "  TAM used {} of {} ({} left)",
        plan.tam.used, plan.tam.starting, plan.tam.available
    );
    let _ = write!(
        out,
        "  GAM used {} of {} ({} left)",
        plan.gam.used, plan.gam.starting, plan.gam.available
    );

    if !plan.lines.is_empty() {
        let _ = write!(out, "\nBuydowns:");
        for line in &plan.lines {
            let _ = write!(
                out,
                "\n  {}: {} -> {} (TAM {}, GAM {})",
                line.player_id, line.raw_charge, line.charge_after, line.tam, line.gam
            );
            if line.shortfall.is_positive() {
                let _ = write!(out, ", {} short", line.shortfall);
            }
        }
    }

    if !report.issues.is_empty() {
        let _ = write!(out, "\nIssues:");
        for issue in &report.issues {
            let _ = write!(out, "\n  - {}", issue);
        }
    }
    out
}

pub fn render_verdict(verdict: &SigningVerdict) -> String {
    let mut out = String::new();
    let headline = if verdict.can_sign { "CAN SIGN" } else { "CANNOT SIGN" };
    let _ = writeln!(out, "Signing verdict ({}): {}", verdict.year, headline);
    match verdict.optimal_designation {
        Some(designation) => {
            let _ = writeln!(out, "  Designation:           {}", designation);
        }
        None => {
            let _ = writeln!(out, "  Designation:           none available");
        }
    }
    let _ = writeln!(out, "  Raw charge:            {}", verdict.raw_charge);
    let _ = writeln!(out, "  Budget charge:         {}", verdict.final_charge);
    if let Some(buydown) = verdict.buydown {
        let _ = writeln!(out, "  Buydown:               TAM {}, GAM {}", buydown.tam, buydown.gam);
    }
    let _ = writeln!(out, "  Cap space before:      {}", verdict.cap_space_before);
    let _ = write!(out, "  Cap space after:       {}", verdict.cap_space_after);
    if let Some(requested) = &verdict.requested {
        let _ = write!(out, "\n  {}", requested.note);
        if let Some(charge) = requested.charge {
            let _ = write!(out, " at {}", charge);
        }
    }
    if !verdict.issues.is_empty() {
        let _ = write!(out, "\nIssues:");
        for issue in &verdict.issues {
            let marker = if issue.blocking { "-" } else { "*" };
            let _ = write!(out, "\n  {} {}", marker, issue);
        }
    }
    out
}

pub fn render_sale(sale: &SaleAllocation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "GAM from sale of {}", sale.gross_fee);
    let _ = writeln!(out, "  League fee:            -{}", sale.league_fee);
    let _ = writeln!(out, "  Agent fee:             -{}", sale.agent_fee);
    let _ = writeln!(out, "  Net revenue:           {}", sale.net_revenue);
    for (i, tier) in sale.tiers.iter().enumerate() {
        let _ = writeln!(
            out,
            "  Tier {}: {} at {} = {}",
            i + 1,
            tier.slice,
            pct(tier.rate_bps),
            tier.gam
        );
    }
    let _ = writeln!(out, "  Base GAM:              {}", sale.base_gam);
    for bonus in &sale.bonuses {
        let reason = match bonus.reason {
            BonusReason::Homegrown => "Homegrown bonus",
            BonusReason::YoungPlayer => "Young player bonus",
        };
        let _ = writeln!(out, "  {} (+{}): {}", reason, pct(bonus.rate_bps), bonus.amount);
    }
    let capped = if sale.capped {
        format!(" (capped from {})", sale.uncapped_gam)
    } else {
        String::new()
    };
    let _ = write!(out, "  GAM generated:         {}{}", sale.gam_generated, capped);
    out
}
