//! Signing feasibility evaluator
//!
//! Decides how a prospective player would be carried on the roster and
//! whether the club can afford it. Designations are tried cheapest first:
//!
//! 1. U22 Initiative (age and salary under the ceilings, U22 slot free)
//! 2. Senior at raw charge (raw charge within the individual maximum)
//! 3. Young DP (age eligible, DP slot free)
//! 4. DP (DP slot free)
//! 5. Senior bought down to the maximum with TAM/GAM
//!
//! The first that applies wins. Slot and budget problems are collected as
//! issues rather than stopping the evaluation, so a caller always sees every
//! reason a signing fails.

use super::allocation::{reset_to_auto, AllocationState};
use super::charge::{dp_charge_for_age, is_u22_eligible, is_young_dp};
use super::compliance::{evaluate as evaluate_roster, ComplianceReport};
use super::issue::{Gap, Issue, IssueKind};
use crate::data::SeasonRules;
use crate::error::{CapError, Result};
use crate::models::{AcquisitionTerms, Money, Player};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Designation a caller may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum RequestedDesignation {
    #[serde(rename = "DP")]
    Dp,
    #[serde(rename = "TAM")]
    Tam,
    U22,
    #[default]
    Senior,
}

impl fmt::Display for RequestedDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestedDesignation::Dp => f.write_str("DP"),
            RequestedDesignation::Tam => f.write_str("TAM"),
            RequestedDesignation::U22 => f.write_str("U22"),
            RequestedDesignation::Senior => f.write_str("Senior"),
        }
    }
}

/// Designation the evaluator settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningDesignation {
    U22,
    Senior,
    #[serde(rename = "Young DP")]
    YoungDp,
    #[serde(rename = "DP")]
    Dp,
    /// Senior contract bought down to the maximum charge.
    #[serde(rename = "TAM")]
    TamBuydown,
}

impl fmt::Display for SigningDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningDesignation::U22 => f.write_str("U22"),
            SigningDesignation::Senior => f.write_str("Senior"),
            SigningDesignation::YoungDp => f.write_str("Young DP"),
            SigningDesignation::Dp => f.write_str("DP"),
            SigningDesignation::TamBuydown => f.write_str("TAM-bought-down Senior"),
        }
    }
}

/// A hypothetical signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SigningCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub salary: Money,
    pub age: u8,
    #[serde(default)]
    pub transfer_fee: Money,
    #[serde(default)]
    pub gam_transfer_fee: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_years_guaranteed: Option<u32>,
    #[serde(default)]
    pub is_international: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<RequestedDesignation>,
}

impl SigningCandidate {
    pub fn new(salary: Money, age: u8) -> Self {
        SigningCandidate {
            name: None,
            salary,
            age,
            transfer_fee: Money::ZERO,
            gam_transfer_fee: Money::ZERO,
            contract_years_guaranteed: None,
            is_international: false,
            designation: None,
        }
    }

    fn acquisition(&self) -> AcquisitionTerms {
        AcquisitionTerms {
            cash_transfer_fee: self.transfer_fee,
            gam_transfer_fee: self.gam_transfer_fee,
            contract_years_guaranteed: self.contract_years_guaranteed,
        }
    }

    pub fn raw_charge(&self) -> Money {
        self.salary + self.acquisition().amortized_cash_fee()
    }

    fn validate(&self) -> Result<()> {
        let label = self.name.as_deref().unwrap_or("candidate");
        for (field, value) in [
            ("salary", self.salary),
            ("transfer_fee", self.transfer_fee),
            ("gam_transfer_fee", self.gam_transfer_fee),
        ] {
            if value.is_negative() {
                return Err(CapError::invalid_player(label, format!("{field} is negative ({value})")));
            }
        }
        if self.transfer_fee.is_positive() && self.contract_years_guaranteed == Some(0) {
            return Err(CapError::invalid_player(
                label,
                "cash transfer fee set with zero guaranteed contract years",
            ));
        }
        Ok(())
    }
}

/// Current roster with its allocation-money state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterState {
    pub players: Vec<Player>,
    pub allocations: AllocationState,
}

impl RosterState {
    /// Roster with a fresh automatic buydown pass.
    pub fn auto(players: Vec<Player>, rules: &SeasonRules) -> Self {
        let allocations = reset_to_auto(&players, rules);
        RosterState { players, allocations }
    }

    pub fn empty(rules: &SeasonRules) -> Self {
        RosterState { players: Vec::new(), allocations: AllocationState::full(rules) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuydownSplit {
    pub tam: Money,
    pub gam: Money,
}

/// How the requested designation compares with the recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedOutcome {
    pub designation: RequestedDesignation,
    pub applicable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge: Option<Money>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningVerdict {
    pub year: u16,
    pub can_sign: bool,
    pub optimal_designation: Option<SigningDesignation>,
    pub raw_charge: Money,
    pub final_charge: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buydown: Option<BuydownSplit>,
    pub cap_space_before: Money,
    pub cap_space_after: Money,
    pub issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<RequestedOutcome>,
}

/// What the evaluator needs to know about the roster.
struct Capacity {
    senior_room: bool,
    supplemental_room: bool,
    dp_room: bool,
    u22_room: bool,
    international_room: bool,
    international_over_by: u16,
    tam_available: Money,
    gam_available: Money,
}

impl Capacity {
    fn from_report(report: &ComplianceReport, allocations: &AllocationState) -> Self {
        let slots = &report.slots;
        Capacity {
            senior_room: slots.senior_roster.has_room(),
            supplemental_room: slots.supplemental_roster.has_room(),
            dp_room: slots.designated_players.has_room(),
            u22_room: slots.u22.has_room(),
            international_room: slots.international.has_room(),
            international_over_by: slots
                .international
                .used
                .saturating_add(1)
                .saturating_sub(slots.international.max),
            tam_available: allocations.tam.available(),
            gam_available: allocations.gam.available(),
        }
    }
}

/// Splits a buydown between the pools. TAM is drawn first when the raw
/// charge sits in the TAM window, GAM first otherwise. Callers check that
/// `needed` fits in the combined balance.
fn split_buydown(
    needed: Money,
    raw_charge: Money,
    capacity: &Capacity,
    rules: &SeasonRules,
) -> BuydownSplit {
    if rules.tam_eligible_charge_range.contains(raw_charge) {
        let tam = needed.min(capacity.tam_available);
        BuydownSplit { tam, gam: needed - tam }
    } else {
        let gam = needed.min(capacity.gam_available);
        BuydownSplit { tam: needed - gam, gam }
    }
}

/// Evaluates `candidate` against `roster` under `rules`.
pub fn evaluate(
    candidate: &SigningCandidate,
    roster: &RosterState,
    rules: &SeasonRules,
) -> Result<SigningVerdict> {
    candidate.validate()?;

    let report = evaluate_roster(&roster.players, rules, &roster.allocations);
    let capacity = Capacity::from_report(&report, &roster.allocations);
    let raw_charge = candidate.raw_charge();
    let needed = raw_charge.saturating_sub_floor(rules.max_individual_charge);
    let allocation_available = capacity.tam_available + capacity.gam_available;

    let mut issues = Vec::new();
    let mut can_sign = true;

    if candidate.is_international && !capacity.international_room {
        can_sign = false;
        issues.push(Issue::blocking(
            IssueKind::InternationalSlotsFull,
            "No international slot available",
            Some(Gap::Slots(capacity.international_over_by)),
        ));
    }

    if !capacity.senior_room && !capacity.supplemental_room {
        can_sign = false;
        issues.push(Issue::blocking(
            IssueKind::NoRosterSpot,
            "No senior or supplemental roster spot available",
            Some(Gap::Slots(1)),
        ));
    }

    let mut buydown = None;
    let (optimal_designation, final_charge) =
        if is_u22_eligible(candidate.age, candidate.salary, rules) && capacity.u22_room {
            (Some(SigningDesignation::U22), rules.u22_charge)
        } else if raw_charge <= rules.max_individual_charge {
            (Some(SigningDesignation::Senior), raw_charge)
        } else if is_young_dp(candidate.age, rules) && capacity.dp_room {
            (Some(SigningDesignation::YoungDp), rules.young_dp_charge)
        } else if capacity.dp_room {
            (Some(SigningDesignation::Dp), rules.dp_charge)
        } else if needed <= allocation_available {
            buydown = Some(split_buydown(needed, raw_charge, &capacity, rules));
            (Some(SigningDesignation::TamBuydown), rules.max_individual_charge)
        } else {
            can_sign = false;
            issues.push(Issue::blocking(
                IssueKind::CannotFitPlayer,
                "cannot fit player — no DP slot and insufficient TAM/GAM",
                Some(Gap::Dollars(needed - allocation_available)),
            ));
            (None, raw_charge)
        };

    let cap_space_before = report.cap_space_remaining;
    let cap_space_after = rules.salary_budget - (report.total_budget_charge + final_charge);
    if cap_space_after.is_negative() {
        can_sign = false;
        issues.push(Issue::blocking(
            IssueKind::OverBudget,
            format!(
                "Signing at a {} charge leaves the club over its {} budget",
                final_charge, rules.salary_budget
            ),
            Some(Gap::Dollars(-cap_space_after)),
        ));
    }

    if candidate.salary < rules.senior_min_charge {
        issues.push(Issue::advisory(
            IssueKind::BelowMinimumSalary,
            format!(
                "Salary {} is below the senior minimum of {}",
                candidate.salary, rules.senior_min_charge
            ),
        ));
    }

    let requested = candidate.designation.map(|designation| {
        let outcome = requested_outcome(
            designation,
            candidate,
            raw_charge,
            needed,
            allocation_available,
            &capacity,
            rules,
        );
        if !outcome.applicable {
            issues.push(Issue::advisory(
                IssueKind::RequestedDesignationUnavailable,
                outcome.note.clone(),
            ));
        }
        outcome
    });

    debug!(
        raw = %raw_charge,
        needed = %needed,
        tam = %capacity.tam_available,
        gam = %capacity.gam_available,
        "signing inputs"
    );
    info!(
        year = rules.year,
        can_sign,
        designation = ?optimal_designation,
        charge = %final_charge,
        space_after = %cap_space_after,
        "signing evaluated"
    );

    Ok(SigningVerdict {
        year: rules.year,
        can_sign,
        optimal_designation,
        raw_charge,
        final_charge,
        buydown,
        cap_space_before,
        cap_space_after,
        issues,
        requested,
    })
}

fn requested_outcome(
    designation: RequestedDesignation,
    candidate: &SigningCandidate,
    raw_charge: Money,
    needed: Money,
    allocation_available: Money,
    capacity: &Capacity,
    rules: &SeasonRules,
) -> RequestedOutcome {
    let (applicable, charge, reason) = match designation {
        RequestedDesignation::Senior => {
            if raw_charge <= rules.max_individual_charge {
                (true, Some(raw_charge), String::new())
            } else {
                (
                    false,
                    None,
                    format!(
                        "raw charge {} exceeds the {} maximum",
                        raw_charge, rules.max_individual_charge
                    ),
                )
            }
        }
        RequestedDesignation::U22 => {
            if !is_u22_eligible(candidate.age, candidate.salary, rules) {
                (
                    false,
                    None,
                    format!(
                        "U22 requires age <= {} and salary <= {}",
                        rules.u22_max_age_at_signing, rules.u22_max_salary
                    ),
                )
            } else if !capacity.u22_room {
                (false, None, "no U22 slot free".to_string())
            } else {
                (true, Some(rules.u22_charge), String::new())
            }
        }
        RequestedDesignation::Dp => {
            if capacity.dp_room {
                (true, Some(dp_charge_for_age(candidate.age, rules).1), String::new())
            } else {
                (false, None, "no DP slot free".to_string())
            }
        }
        RequestedDesignation::Tam => {
            if needed.is_zero() {
                (false, None, "raw charge is already within the maximum".to_string())
            } else if needed <= allocation_available {
                (true, Some(rules.max_individual_charge), String::new())
            } else {
                (
                    false,
                    None,
                    format!(
                        "buydown of {} exceeds available TAM/GAM {}",
                        needed, allocation_available
                    ),
                )
            }
        }
    };

    let note = if applicable {
        format!("Requested {designation} is available")
    } else {
        format!("Requested {designation} not applicable: {reason}")
    };
    RequestedOutcome { designation, applicable, charge, note }
}
