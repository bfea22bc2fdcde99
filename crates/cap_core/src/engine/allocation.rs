//! Allocation-money allocator
//!
//! TAM and GAM buy a senior player's charge down to the individual maximum.
//! Pool balances live in an [`AllocationState`] value owned by the caller;
//! every pass or edit returns a new state and leaves the input untouched,
//! so what-if evaluations just clone.
//!
//! Automatic pass: players needing a buydown are served largest raw charge
//! first (ties by player id). TAM goes first when the player is eligible,
//! GAM covers whatever is left. Manual edits set one pool's amount on one
//! player; a non-zero amount clears that player's amount in the other pool.

use super::charge::{charge_of, ChargeBreakdown};
use crate::data::SeasonRules;
use crate::error::{CapError, Result};
use crate::models::{Money, Player, RosterSlot};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum PoolKind {
    #[serde(rename = "TAM")]
    Tam,
    #[serde(rename = "GAM")]
    Gam,
}

impl PoolKind {
    pub fn other(self) -> PoolKind {
        match self {
            PoolKind::Tam => PoolKind::Gam,
            PoolKind::Gam => PoolKind::Tam,
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::Tam => f.write_str("TAM"),
            PoolKind::Gam => f.write_str("GAM"),
        }
    }
}

/// One allocation-money pool for a club-season.
///
/// Invariant: `Σ used_by == starting - available` and `available >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPool {
    pub kind: PoolKind,
    starting: Money,
    available: Money,
    used_by: BTreeMap<String, Money>,
}

impl AllocationPool {
    pub fn new(kind: PoolKind, starting: Money) -> Self {
        AllocationPool {
            kind,
            starting: starting.max(Money::ZERO),
            available: starting.max(Money::ZERO),
            used_by: BTreeMap::new(),
        }
    }

    pub fn starting(&self) -> Money {
        self.starting
    }

    pub fn available(&self) -> Money {
        self.available
    }

    pub fn used(&self) -> Money {
        self.used_by.values().sum()
    }

    pub fn used_by(&self) -> &BTreeMap<String, Money> {
        &self.used_by
    }

    pub fn applied_to(&self, player_id: &str) -> Money {
        self.used_by.get(player_id).copied().unwrap_or(Money::ZERO)
    }

    /// Sets `player_id`'s amount, moving the difference in or out of
    /// `available`. Callers keep `amount <= available + current`.
    fn set_amount(&mut self, player_id: &str, amount: Money) {
        let current = self.applied_to(player_id);
        self.available = self.available + current - amount;
        debug_assert!(!self.available.is_negative(), "{} pool overdrawn", self.kind);
        if amount.is_zero() {
            self.used_by.remove(player_id);
        } else {
            self.used_by.insert(player_id.to_string(), amount);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    Automatic,
    Manual,
}

/// Both pools for one club-season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationState {
    pub tam: AllocationPool,
    pub gam: AllocationPool,
    pub mode: AllocationMode,
}

impl AllocationState {
    /// Full annual balances, nothing spent.
    pub fn full(rules: &SeasonRules) -> Self {
        Self::with_balances(rules.tam_annual, rules.gam_annual)
    }

    pub fn with_balances(tam: Money, gam: Money) -> Self {
        AllocationState {
            tam: AllocationPool::new(PoolKind::Tam, tam),
            gam: AllocationPool::new(PoolKind::Gam, gam),
            mode: AllocationMode::Automatic,
        }
    }

    pub fn pool(&self, kind: PoolKind) -> &AllocationPool {
        match kind {
            PoolKind::Tam => &self.tam,
            PoolKind::Gam => &self.gam,
        }
    }

    fn pool_mut(&mut self, kind: PoolKind) -> &mut AllocationPool {
        match kind {
            PoolKind::Tam => &mut self.tam,
            PoolKind::Gam => &mut self.gam,
        }
    }

    /// TAM plus GAM applied to `player_id`.
    pub fn applied_to(&self, player_id: &str) -> Money {
        self.tam.applied_to(player_id) + self.gam.applied_to(player_id)
    }

    pub fn total_available(&self) -> Money {
        self.tam.available + self.gam.available
    }
}

/// TAM may only buy down senior, homegrown or Generation Adidas players on
/// the senior roster whose raw charge sits inside the season's TAM window.
pub fn is_tam_eligible(player: &Player, charge: &ChargeBreakdown, rules: &SeasonRules) -> bool {
    matches!(player.slot, RosterSlot::Senior(_))
        && rules.tam_eligible_charge_range.contains(charge.raw_charge)
}

/// Players the automatic pass serves, in service order.
fn buydown_queue<'a>(
    players: &'a [Player],
    rules: &SeasonRules,
) -> Vec<(&'a Player, ChargeBreakdown)> {
    let mut queue: Vec<_> = players
        .iter()
        .filter(|p| p.is_senior_tier())
        .map(|p| (p, charge_of(p, rules)))
        .filter(|(_, c)| c.needs_buydown)
        .collect();
    queue.sort_by(|(a, ca), (b, cb)| cb.raw_charge.cmp(&ca.raw_charge).then_with(|| a.id.cmp(&b.id)));
    queue
}

/// Automatic pass over `start`.
///
/// Amounts already on a player count toward their need; only the remainder
/// is drawn. Shortfalls are left in place for the compliance check.
pub fn auto_allocate(
    players: &[Player],
    rules: &SeasonRules,
    start: &AllocationState,
) -> AllocationState {
    let mut state = start.clone();
    state.mode = AllocationMode::Automatic;

    for (player, charge) in buydown_queue(players, rules) {
        let needed = charge.buydown_needed(rules);
        let mut remaining = needed.saturating_sub_floor(state.applied_to(&player.id));
        if remaining.is_zero() {
            continue;
        }

        let mut tam_applied = Money::ZERO;
        if is_tam_eligible(player, &charge, rules) {
            tam_applied = remaining.min(state.tam.available);
            if tam_applied.is_positive() {
                let current = state.tam.applied_to(&player.id);
                state.tam.set_amount(&player.id, current + tam_applied);
                remaining -= tam_applied;
            }
        }

        let gam_applied = remaining.min(state.gam.available);
        if gam_applied.is_positive() {
            let current = state.gam.applied_to(&player.id);
            state.gam.set_amount(&player.id, current + gam_applied);
            remaining -= gam_applied;
        }

        debug!(
            player = %player.id,
            needed = %needed,
            tam = %tam_applied,
            gam = %gam_applied,
            short = %remaining,
            "auto buydown"
        );
        if remaining.is_positive() {
            warn!(player = %player.id, short = %remaining, "allocation pools exhausted");
        }
    }

    info!(
        tam_available = %state.tam.available,
        gam_available = %state.gam.available,
        "automatic allocation pass complete"
    );
    state
}

/// Discards every edit and reruns the automatic pass from full balances.
pub fn reset_to_auto(players: &[Player], rules: &SeasonRules) -> AllocationState {
    auto_allocate(players, rules, &AllocationState::full(rules))
}

/// Why a manual edit was refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditRejection {
    TamIneligible,
}

impl fmt::Display for EditRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditRejection::TamIneligible => f.write_str("player is not eligible for TAM"),
        }
    }
}

/// Result of a manual edit. `clamped` is set when the applied amount
/// differs from what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEdit {
    pub state: AllocationState,
    pub player_id: String,
    pub pool: PoolKind,
    pub requested: Money,
    pub applied: Money,
    pub clamped: bool,
    pub rejection: Option<EditRejection>,
}

impl AllocationState {
    /// Sets `pool`'s amount on `player_id` to `requested`, within the rules.
    pub fn set_manual(
        &self,
        players: &[Player],
        rules: &SeasonRules,
        player_id: &str,
        pool: PoolKind,
        requested: Money,
    ) -> Result<ManualEdit> {
        let player = players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or_else(|| CapError::UnknownPlayer(player_id.to_string()))?;
        let charge = charge_of(player, rules);
        let current = self.pool(pool).applied_to(player_id);

        if pool == PoolKind::Tam && !is_tam_eligible(player, &charge, rules) {
            warn!(player = %player_id, "manual TAM edit rejected: not TAM eligible");
            return Ok(ManualEdit {
                state: self.clone(),
                player_id: player_id.to_string(),
                pool,
                requested,
                applied: current,
                clamped: requested != current,
                rejection: Some(EditRejection::TamIneligible),
            });
        }

        let needed = charge.buydown_needed(rules);
        let ceiling = needed.min(self.pool(pool).available + current);
        let applied = requested.clamp(Money::ZERO, ceiling);
        let clamped = applied != requested;
        if clamped {
            debug!(player = %player_id, %pool, requested = %requested, applied = %applied, "manual amount clamped");
        }

        let mut state = self.clone();
        state.mode = AllocationMode::Manual;
        state.pool_mut(pool).set_amount(player_id, applied);
        if applied.is_positive() {
            state.pool_mut(pool.other()).set_amount(player_id, Money::ZERO);
        }

        Ok(ManualEdit {
            state,
            player_id: player_id.to_string(),
            pool,
            requested,
            applied,
            clamped,
            rejection: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub kind: PoolKind,
    pub starting: Money,
    pub used: Money,
    pub available: Money,
}

impl From<&AllocationPool> for PoolSummary {
    fn from(pool: &AllocationPool) -> Self {
        PoolSummary {
            kind: pool.kind,
            starting: pool.starting,
            used: pool.used(),
            available: pool.available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub player_id: String,
    pub raw_charge: Money,
    pub buydown_needed: Money,
    pub tam_eligible: bool,
    pub tam: Money,
    pub gam: Money,
    pub charge_after: Money,
    pub shortfall: Money,
}

/// Buydown plan for display: one line per player needing a buydown, in
/// automatic service order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub mode: AllocationMode,
    pub lines: Vec<AllocationLine>,
    pub tam: PoolSummary,
    pub gam: PoolSummary,
    pub total_shortfall: Money,
}

pub fn allocation_plan(
    players: &[Player],
    rules: &SeasonRules,
    state: &AllocationState,
) -> AllocationPlan {
    let lines: Vec<AllocationLine> = buydown_queue(players, rules)
        .into_iter()
        .map(|(player, charge)| {
            let needed = charge.buydown_needed(rules);
            let tam = state.tam.applied_to(&player.id);
            let gam = state.gam.applied_to(&player.id);
            AllocationLine {
                player_id: player.id.clone(),
                raw_charge: charge.raw_charge,
                buydown_needed: needed,
                tam_eligible: is_tam_eligible(player, &charge, rules),
                tam,
                gam,
                charge_after: charge.charge_after(tam + gam),
                shortfall: needed.saturating_sub_floor(tam + gam),
            }
        })
        .collect();
    let total_shortfall = lines.iter().map(|l| l.shortfall).sum();

    AllocationPlan {
        mode: state.mode,
        lines,
        tam: PoolSummary::from(&state.tam),
        gam: PoolSummary::from(&state.gam),
        total_shortfall,
    }
}
