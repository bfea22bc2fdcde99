//! Outgoing-sale allocation calculator
//!
//! Converts the fee received for a departing player into General Allocation
//! Money. League and agent fees come off the gross first; the net is run
//! through marginal tiers; homegrown and young-player bonuses are added on
//! top of the tiered base; the total is capped.
//!
//! Rates are basis points (1% = 100) so the whole calculation stays in
//! integer cents.

use crate::error::{CapError, Result};
use crate::models::Money;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BPS_PER_UNIT: u32 = 10_000;

/// One marginal tier. `up_to` is the upper bound of the net revenue this
/// tier covers; `None` means unbounded and is only valid on the last tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SaleTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<Money>,
    pub rate_bps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SaleTerms {
    pub league_fee_bps: u32,
    pub agent_fee_bps: u32,
    pub tiers: Vec<SaleTier>,
    pub homegrown_bonus_bps: u32,
    pub young_player_bonus_bps: u32,
    /// Players strictly younger than this earn the young-player bonus.
    pub young_player_age_limit: u8,
    pub cap: Money,
}

impl Default for SaleTerms {
    fn default() -> Self {
        SaleTerms {
            league_fee_bps: 500,
            agent_fee_bps: 1_000,
            tiers: vec![
                SaleTier { up_to: Some(Money::from_dollars(1_000_000)), rate_bps: 5_000 },
                SaleTier { up_to: Some(Money::from_dollars(3_000_000)), rate_bps: 4_000 },
                SaleTier { up_to: None, rate_bps: 2_500 },
            ],
            homegrown_bonus_bps: 1_500,
            young_player_bonus_bps: 1_000,
            young_player_age_limit: 23,
            cap: Money::from_dollars(3_000_000),
        }
    }
}

impl SaleTerms {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(CapError::InvalidSaleTerms(reason));

        if self.league_fee_bps + self.agent_fee_bps > BPS_PER_UNIT {
            return invalid(format!(
                "league and agent fees total {} bps, above 100%",
                self.league_fee_bps + self.agent_fee_bps
            ));
        }
        if self.cap.is_negative() {
            return invalid(format!("cap is negative ({})", self.cap));
        }
        let Some((last, bounded)) = self.tiers.split_last() else {
            return invalid("at least one tier is required".to_string());
        };
        if last.up_to.is_some() {
            return invalid("last tier must be unbounded".to_string());
        }
        let mut floor = Money::ZERO;
        for tier in bounded {
            match tier.up_to {
                Some(ceiling) if ceiling > floor => floor = ceiling,
                Some(ceiling) => {
                    return invalid(format!("tier ceilings must ascend ({ceiling} after {floor})"))
                }
                None => return invalid("only the last tier may be unbounded".to_string()),
            }
        }
        for tier in &self.tiers {
            if tier.rate_bps > BPS_PER_UNIT {
                return invalid(format!("tier rate {} bps is above 100%", tier.rate_bps));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSlice {
    pub from: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Money>,
    /// Portion of net revenue inside this tier.
    pub slice: Money,
    pub rate_bps: u32,
    pub gam: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusReason {
    Homegrown,
    YoungPlayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleBonus {
    pub reason: BonusReason,
    pub rate_bps: u32,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleAllocation {
    pub gross_fee: Money,
    pub league_fee: Money,
    pub agent_fee: Money,
    pub net_revenue: Money,
    pub tiers: Vec<TierSlice>,
    pub base_gam: Money,
    pub bonuses: Vec<SaleBonus>,
    pub uncapped_gam: Money,
    pub gam_generated: Money,
    pub capped: bool,
}

/// GAM generated by selling a player for `gross_fee`.
pub fn gam_from_sale(
    gross_fee: Money,
    is_homegrown: bool,
    player_age: u8,
    terms: &SaleTerms,
) -> Result<SaleAllocation> {
    terms.validate()?;
    if gross_fee.is_negative() {
        return Err(CapError::InvalidAmount {
            field: "transfer_fee".to_string(),
            value: gross_fee.to_string(),
        });
    }

    let league_fee = gross_fee.apply_bps(terms.league_fee_bps);
    let agent_fee = gross_fee.apply_bps(terms.agent_fee_bps);
    let net_revenue = gross_fee - league_fee - agent_fee;

    let mut tiers = Vec::new();
    let mut from = Money::ZERO;
    for tier in &terms.tiers {
        if net_revenue <= from {
            break;
        }
        let top = tier.up_to.map_or(net_revenue, |ceiling| ceiling.min(net_revenue));
        let slice = top - from;
        tiers.push(TierSlice {
            from,
            to: tier.up_to,
            slice,
            rate_bps: tier.rate_bps,
            gam: slice.apply_bps(tier.rate_bps),
        });
        from = top;
    }
    let base_gam: Money = tiers.iter().map(|t| t.gam).sum();

    let mut bonuses = Vec::new();
    if is_homegrown {
        bonuses.push(SaleBonus {
            reason: BonusReason::Homegrown,
            rate_bps: terms.homegrown_bonus_bps,
            amount: base_gam.apply_bps(terms.homegrown_bonus_bps),
        });
    }
    if player_age < terms.young_player_age_limit {
        bonuses.push(SaleBonus {
            reason: BonusReason::YoungPlayer,
            rate_bps: terms.young_player_bonus_bps,
            amount: base_gam.apply_bps(terms.young_player_bonus_bps),
        });
    }

    let uncapped_gam = base_gam + bonuses.iter().map(|b| b.amount).sum::<Money>();
    let gam_generated = uncapped_gam.min(terms.cap);
    let capped = uncapped_gam > terms.cap;

    debug!(
        gross = %gross_fee,
        net = %net_revenue,
        base = %base_gam,
        generated = %gam_generated,
        capped,
        "sale GAM computed"
    );

    Ok(SaleAllocation {
        gross_fee,
        league_fee,
        agent_fee,
        net_revenue,
        tiers,
        base_gam,
        bonuses,
        uncapped_gam,
        gam_generated,
        capped,
    })
}
