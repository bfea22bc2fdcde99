//! Player records
//!
//! Rosters arrive as flat [`PlayerRecord`]s (every acquisition field
//! optional, designation and tier as separate enums). Before any rule runs
//! a record is validated into a [`Player`], whose [`RosterSlot`] only admits
//! the designation/tier pairs the league allows: a DP or U22 player always
//! sits on the senior roster, and a supplemental-roster player can never
//! carry a DP or U22 charge.

use super::money::Money;
use crate::error::{CapError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roster designation as it appears in roster data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Designation {
    Senior,
    #[serde(rename = "DP")]
    DesignatedPlayer,
    U22,
    Supplemental,
    Homegrown,
    GenerationAdidas,
}

impl Designation {
    pub fn label(self) -> &'static str {
        match self {
            Designation::Senior => "Senior",
            Designation::DesignatedPlayer => "DP",
            Designation::U22 => "U22",
            Designation::Supplemental => "Supplemental",
            Designation::Homegrown => "Homegrown",
            Designation::GenerationAdidas => "GenerationAdidas",
        }
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RosterTier {
    Senior,
    Supplemental,
}

/// Designations a senior-roster, non-DP, non-U22 player may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeniorDesignation {
    Senior,
    Homegrown,
    GenerationAdidas,
}

/// Designations allowed on the supplemental roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplementalDesignation {
    Supplemental,
    Homegrown,
    GenerationAdidas,
}

/// Where a player sits and which charge rule governs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RosterSlot {
    DesignatedPlayer,
    U22Initiative,
    Senior(SeniorDesignation),
    Supplemental(SupplementalDesignation),
}

impl RosterSlot {
    pub fn tier(self) -> RosterTier {
        match self {
            RosterSlot::Supplemental(_) => RosterTier::Supplemental,
            _ => RosterTier::Senior,
        }
    }

    pub fn designation(self) -> Designation {
        match self {
            RosterSlot::DesignatedPlayer => Designation::DesignatedPlayer,
            RosterSlot::U22Initiative => Designation::U22,
            RosterSlot::Senior(SeniorDesignation::Senior) => Designation::Senior,
            RosterSlot::Senior(SeniorDesignation::Homegrown) => Designation::Homegrown,
            RosterSlot::Senior(SeniorDesignation::GenerationAdidas) => {
                Designation::GenerationAdidas
            }
            RosterSlot::Supplemental(SupplementalDesignation::Supplemental) => {
                Designation::Supplemental
            }
            RosterSlot::Supplemental(SupplementalDesignation::Homegrown) => Designation::Homegrown,
            RosterSlot::Supplemental(SupplementalDesignation::GenerationAdidas) => {
                Designation::GenerationAdidas
            }
        }
    }

    fn from_parts(designation: Designation, tier: RosterTier) -> Option<Self> {
        let slot = match (designation, tier) {
            (Designation::DesignatedPlayer, RosterTier::Senior) => RosterSlot::DesignatedPlayer,
            (Designation::U22, RosterTier::Senior) => RosterSlot::U22Initiative,
            (Designation::Senior, RosterTier::Senior) => {
                RosterSlot::Senior(SeniorDesignation::Senior)
            }
            (Designation::Homegrown, RosterTier::Senior) => {
                RosterSlot::Senior(SeniorDesignation::Homegrown)
            }
            (Designation::GenerationAdidas, RosterTier::Senior) => {
                RosterSlot::Senior(SeniorDesignation::GenerationAdidas)
            }
            (Designation::Supplemental, RosterTier::Supplemental) => {
                RosterSlot::Supplemental(SupplementalDesignation::Supplemental)
            }
            (Designation::Homegrown, RosterTier::Supplemental) => {
                RosterSlot::Supplemental(SupplementalDesignation::Homegrown)
            }
            (Designation::GenerationAdidas, RosterTier::Supplemental) => {
                RosterSlot::Supplemental(SupplementalDesignation::GenerationAdidas)
            }
            _ => return None,
        };
        Some(slot)
    }
}

/// Acquisition cost attached to a contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionTerms {
    /// Transfer fee paid in cash; amortizes into the charge.
    pub cash_transfer_fee: Money,
    /// Transfer fee paid with GAM; never part of the charge.
    pub gam_transfer_fee: Money,
    /// Guaranteed contract years; `None` means no amortization schedule.
    pub contract_years_guaranteed: Option<u32>,
}

impl AcquisitionTerms {
    /// Cash fee spread over the guaranteed years. Zero with no fee or no
    /// schedule.
    pub fn amortized_cash_fee(&self) -> Money {
        if !self.cash_transfer_fee.is_positive() {
            return Money::ZERO;
        }
        self.contract_years_guaranteed
            .and_then(|years| self.cash_transfer_fee.split_even(years))
            .unwrap_or(Money::ZERO)
    }
}

/// Flat roster row as produced by external roster data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub guaranteed_compensation: Money,
    pub designation: Designation,
    pub age_at_acquisition: u8,
    #[serde(default)]
    pub is_international_slot_user: bool,
    #[serde(default = "default_tier")]
    pub roster_tier: RosterTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_transfer_fee: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gam_transfer_fee: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_years_guaranteed: Option<u32>,
}

fn default_tier() -> RosterTier {
    RosterTier::Senior
}

/// A validated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: Option<String>,
    pub guaranteed_compensation: Money,
    pub age_at_acquisition: u8,
    pub international: bool,
    pub slot: RosterSlot,
    pub acquisition: AcquisitionTerms,
}

impl Player {
    /// Senior-roster player with no acquisition fee.
    pub fn senior(id: impl Into<String>, compensation: Money, age: u8) -> Self {
        Player {
            id: id.into(),
            name: None,
            guaranteed_compensation: compensation,
            age_at_acquisition: age,
            international: false,
            slot: RosterSlot::Senior(SeniorDesignation::Senior),
            acquisition: AcquisitionTerms::default(),
        }
    }

    pub fn with_slot(mut self, slot: RosterSlot) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn international(mut self) -> Self {
        self.international = true;
        self
    }

    pub fn with_acquisition(mut self, acquisition: AcquisitionTerms) -> Self {
        self.acquisition = acquisition;
        self
    }

    pub fn designation(&self) -> Designation {
        self.slot.designation()
    }

    pub fn tier(&self) -> RosterTier {
        self.slot.tier()
    }

    pub fn is_senior_tier(&self) -> bool {
        self.tier() == RosterTier::Senior
    }

    /// Guaranteed compensation plus the amortized cash fee.
    pub fn raw_charge(&self) -> Money {
        self.guaranteed_compensation + self.acquisition.amortized_cash_fee()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl TryFrom<PlayerRecord> for Player {
    type Error = CapError;

    fn try_from(record: PlayerRecord) -> Result<Self> {
        if record.id.trim().is_empty() {
            return Err(CapError::invalid_player("<blank>", "player id must not be empty"));
        }
        if record.guaranteed_compensation.is_negative() {
            return Err(CapError::invalid_player(
                &record.id,
                format!("guaranteed compensation is negative ({})", record.guaranteed_compensation),
            ));
        }

        let slot = RosterSlot::from_parts(record.designation, record.roster_tier).ok_or_else(|| {
            CapError::invalid_player(
                &record.id,
                format!(
                    "designation {} cannot be held on the {:?} roster",
                    record.designation, record.roster_tier
                ),
            )
        })?;

        let cash_fee = record.cash_transfer_fee.unwrap_or(Money::ZERO);
        let gam_fee = record.gam_transfer_fee.unwrap_or(Money::ZERO);
        for (field, fee) in [("cash_transfer_fee", cash_fee), ("gam_transfer_fee", gam_fee)] {
            if fee.is_negative() {
                return Err(CapError::invalid_player(
                    &record.id,
                    format!("{field} is negative ({fee})"),
                ));
            }
        }
        if cash_fee.is_positive() && record.contract_years_guaranteed == Some(0) {
            return Err(CapError::invalid_player(
                &record.id,
                "cash transfer fee set with zero guaranteed contract years",
            ));
        }

        Ok(Player {
            id: record.id,
            name: record.name,
            guaranteed_compensation: record.guaranteed_compensation,
            age_at_acquisition: record.age_at_acquisition,
            international: record.is_international_slot_user,
            slot,
            acquisition: AcquisitionTerms {
                cash_transfer_fee: cash_fee,
                gam_transfer_fee: gam_fee,
                contract_years_guaranteed: record.contract_years_guaranteed,
            },
        })
    }
}

impl From<&Player> for PlayerRecord {
    fn from(player: &Player) -> Self {
        let fee = |m: Money| if m.is_zero() { None } else { Some(m) };
        PlayerRecord {
            id: player.id.clone(),
            name: player.name.clone(),
            guaranteed_compensation: player.guaranteed_compensation,
            designation: player.designation(),
            age_at_acquisition: player.age_at_acquisition,
            is_international_slot_user: player.international,
            roster_tier: player.tier(),
            cash_transfer_fee: fee(player.acquisition.cash_transfer_fee),
            gam_transfer_fee: fee(player.acquisition.gam_transfer_fee),
            contract_years_guaranteed: player.acquisition.contract_years_guaranteed,
        }
    }
}

/// Validates a roster snapshot, rejecting the first malformed record and
/// any repeated player id.
pub fn validate_roster(records: Vec<PlayerRecord>) -> Result<Vec<Player>> {
    let mut seen = std::collections::BTreeSet::new();
    let mut players = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id.clone()) {
            return Err(CapError::DuplicatePlayer(record.id));
        }
        players.push(Player::try_from(record)?);
    }
    Ok(players)
}
