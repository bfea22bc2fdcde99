//! Budget-charge calculator
//!
//! Turns one player plus the season's rules into the amount that counts
//! against the club's salary budget. Pure: no state, no logging.

use crate::data::SeasonRules;
use crate::models::{Money, Player, RosterSlot};
use serde::{Deserialize, Serialize};

/// Which rule produced a player's effective charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeBasis {
    DesignatedPlayer,
    YoungDesignatedPlayer,
    U22Initiative,
    /// Listed as U22 but over the age or salary ceiling; charged as senior.
    U22Downgraded,
    SeniorRoster,
    SupplementalRoster,
}

impl ChargeBasis {
    pub fn label(self) -> &'static str {
        match self {
            ChargeBasis::DesignatedPlayer => "DP charge",
            ChargeBasis::YoungDesignatedPlayer => "Young DP charge",
            ChargeBasis::U22Initiative => "U22 Initiative charge",
            ChargeBasis::U22Downgraded => "senior charge (U22 ineligible)",
            ChargeBasis::SeniorRoster => "senior charge",
            ChargeBasis::SupplementalRoster => "off budget (supplemental)",
        }
    }

    /// Bases whose charge is fixed by rule and can never be bought down.
    pub fn is_fixed(self) -> bool {
        matches!(
            self,
            ChargeBasis::DesignatedPlayer
                | ChargeBasis::YoungDesignatedPlayer
                | ChargeBasis::U22Initiative
                | ChargeBasis::SupplementalRoster
        )
    }

    pub fn counts_u22_slot(self) -> bool {
        self == ChargeBasis::U22Initiative
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    pub basis: ChargeBasis,
    pub amortized_fee: Money,
    /// Compensation plus amortized cash fee.
    pub raw_charge: Money,
    /// Charge before any allocation money is applied.
    pub effective_charge: Money,
    pub needs_buydown: bool,
}

impl ChargeBreakdown {
    /// Amount of allocation money needed to reach the individual maximum.
    pub fn buydown_needed(&self, rules: &SeasonRules) -> Money {
        if self.needs_buydown {
            self.raw_charge.saturating_sub_floor(rules.max_individual_charge)
        } else {
            Money::ZERO
        }
    }

    /// Charge after `applied` allocation money, never below zero.
    pub fn charge_after(&self, applied: Money) -> Money {
        if self.basis.is_fixed() {
            self.effective_charge
        } else {
            self.effective_charge.saturating_sub_floor(applied)
        }
    }
}

pub fn is_u22_eligible(age: u8, salary: Money, rules: &SeasonRules) -> bool {
    age <= rules.u22_max_age_at_signing && salary <= rules.u22_max_salary
}

pub fn is_young_dp(age: u8, rules: &SeasonRules) -> bool {
    age <= rules.young_dp_max_age
}

pub fn dp_charge_for_age(age: u8, rules: &SeasonRules) -> (ChargeBasis, Money) {
    if is_young_dp(age, rules) {
        (ChargeBasis::YoungDesignatedPlayer, rules.young_dp_charge)
    } else {
        (ChargeBasis::DesignatedPlayer, rules.dp_charge)
    }
}

/// Budget charge for `player` under `rules`.
pub fn charge_of(player: &Player, rules: &SeasonRules) -> ChargeBreakdown {
    let amortized_fee = player.acquisition.amortized_cash_fee();
    let raw_charge = player.guaranteed_compensation + amortized_fee;

    let senior = |basis| ChargeBreakdown {
        basis,
        amortized_fee,
        raw_charge,
        effective_charge: raw_charge,
        needs_buydown: raw_charge > rules.max_individual_charge,
    };
    let fixed = |basis, charge| ChargeBreakdown {
        basis,
        amortized_fee,
        raw_charge,
        effective_charge: charge,
        needs_buydown: false,
    };

    match player.slot {
        RosterSlot::DesignatedPlayer => {
            let (basis, charge) = dp_charge_for_age(player.age_at_acquisition, rules);
            fixed(basis, charge)
        }
        RosterSlot::U22Initiative => {
            if is_u22_eligible(player.age_at_acquisition, player.guaranteed_compensation, rules) {
                fixed(ChargeBasis::U22Initiative, rules.u22_charge)
            } else {
                senior(ChargeBasis::U22Downgraded)
            }
        }
        RosterSlot::Supplemental(_) => fixed(ChargeBasis::SupplementalRoster, Money::ZERO),
        RosterSlot::Senior(_) => senior(ChargeBasis::SeniorRoster),
    }
}
