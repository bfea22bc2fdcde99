//! Allocator tests: automatic pass order, pool exhaustion, manual edits and
//! the pool invariants.

use super::allocation::*;
use crate::data::{SeasonRuleTable, SeasonRules};
use crate::models::{Money, Player, RosterSlot, SupplementalDesignation};

fn rules() -> SeasonRules {
    SeasonRuleTable::embedded().get(2026).unwrap().clone()
}

fn dollars(d: i64) -> Money {
    Money::from_dollars(d)
}

fn senior(id: &str, pay: i64) -> Player {
    Player::senior(id, dollars(pay), 27)
}

#[test]
fn test_single_player_tam_first() {
    // raw 900,000 vs max 803,125 with the full 2,125,000 TAM pool
    let rules = rules();
    let players = vec![senior("mid", 900_000)];

    let state = reset_to_auto(&players, &rules);

    assert_eq!(state.tam.applied_to("mid"), dollars(96_875));
    assert_eq!(state.gam.applied_to("mid"), Money::ZERO);
    assert_eq!(state.tam.available(), dollars(2_125_000 - 96_875));
    assert_eq!(state.gam.available(), rules.gam_annual);

    let plan = allocation_plan(&players, &rules, &state);
    assert_eq!(plan.lines.len(), 1);
    assert_eq!(plan.lines[0].charge_after, rules.max_individual_charge);
    assert_eq!(plan.total_shortfall, Money::ZERO);
}

#[test]
fn test_tam_ineligible_player_uses_gam() {
    let rules = rules();
    // Above the TAM window's upper bound.
    let players = vec![senior("star", 2_000_000)];

    let state = reset_to_auto(&players, &rules);

    assert_eq!(state.tam.applied_to("star"), Money::ZERO);
    assert_eq!(state.gam.applied_to("star"), dollars(2_000_000 - 803_125));
}

#[test]
fn test_downgraded_u22_never_gets_tam() {
    let rules = rules();
    let players =
        vec![Player::senior("kid", dollars(900_000), 20).with_slot(RosterSlot::U22Initiative)];

    let state = reset_to_auto(&players, &rules);

    assert_eq!(state.tam.applied_to("kid"), Money::ZERO);
    assert_eq!(state.gam.applied_to("kid"), dollars(96_875));
}

#[test]
fn test_largest_raw_charge_served_first() {
    let rules = rules();
    let players = vec![senior("small", 900_000), senior("big", 1_500_000)];
    // Enough TAM for only part of the larger buydown.
    let start = AllocationState::with_balances(dollars(500_000), Money::ZERO);

    let state = auto_allocate(&players, &rules, &start);

    assert_eq!(state.tam.applied_to("big"), dollars(500_000));
    assert_eq!(state.tam.applied_to("small"), Money::ZERO);
    assert_eq!(state.tam.available(), Money::ZERO);

    let plan = allocation_plan(&players, &rules, &state);
    assert_eq!(plan.lines[0].player_id, "big");
    assert_eq!(plan.lines[0].shortfall, dollars(1_500_000 - 803_125 - 500_000));
    assert_eq!(plan.lines[1].shortfall, dollars(96_875));
}

#[test]
fn test_ties_broken_by_player_id() {
    let rules = rules();
    let players = vec![senior("b", 900_000), senior("a", 900_000)];
    let start = AllocationState::with_balances(dollars(100_000), Money::ZERO);

    let state = auto_allocate(&players, &rules, &start);

    assert_eq!(state.tam.applied_to("a"), dollars(96_875));
    assert_eq!(state.tam.applied_to("b"), dollars(3_125));
}

#[test]
fn test_residual_spills_into_gam() {
    let rules = rules();
    let players = vec![senior("mid", 1_000_000)];
    let start = AllocationState::with_balances(dollars(50_000), dollars(1_000_000));

    let state = auto_allocate(&players, &rules, &start);

    assert_eq!(state.tam.applied_to("mid"), dollars(50_000));
    assert_eq!(state.gam.applied_to("mid"), dollars(1_000_000 - 803_125 - 50_000));
}

#[test]
fn test_supplemental_and_dp_untouched() {
    let rules = rules();
    let players = vec![
        Player::senior("dp", dollars(5_000_000), 29).with_slot(RosterSlot::DesignatedPlayer),
        Player::senior("supp", dollars(1_000_000), 18)
            .with_slot(RosterSlot::Supplemental(SupplementalDesignation::Homegrown)),
    ];

    let state = reset_to_auto(&players, &rules);

    assert!(state.tam.used_by().is_empty());
    assert!(state.gam.used_by().is_empty());
}

#[test]
fn test_auto_pass_is_deterministic() {
    let rules = rules();
    let players: Vec<Player> = (0..12)
        .map(|i| senior(&format!("p{i:02}"), 820_000 + (i % 4) * 150_000))
        .collect();
    let start = AllocationState::with_balances(dollars(400_000), dollars(300_000));

    let first = auto_allocate(&players, &rules, &start);
    let second = auto_allocate(&players, &rules, &start);

    assert_eq!(first, second);
}

#[test]
fn test_manual_clamps_to_need() {
    let rules = rules();
    let players = vec![senior("mid", 900_000)];
    let state = AllocationState::full(&rules);

    let edit = state.set_manual(&players, &rules, "mid", PoolKind::Tam, dollars(500_000)).unwrap();

    assert_eq!(edit.applied, dollars(96_875));
    assert!(edit.clamped);
    assert_eq!(edit.rejection, None);
    assert_eq!(edit.state.mode, AllocationMode::Manual);
    // Input state untouched.
    assert_eq!(state.tam.available(), rules.tam_annual);
}

#[test]
fn test_manual_clamps_to_pool_balance() {
    let rules = rules();
    let players = vec![senior("mid", 1_000_000)];
    let state = AllocationState::with_balances(dollars(10_000), dollars(10_000));

    let edit = state.set_manual(&players, &rules, "mid", PoolKind::Gam, dollars(150_000)).unwrap();

    assert_eq!(edit.applied, dollars(10_000));
    assert!(edit.clamped);
    assert_eq!(edit.state.gam.available(), Money::ZERO);
}

#[test]
fn test_manual_negative_request_clamps_to_zero() {
    let rules = rules();
    let players = vec![senior("mid", 900_000)];
    let state = reset_to_auto(&players, &rules);

    let edit = state.set_manual(&players, &rules, "mid", PoolKind::Tam, dollars(-5)).unwrap();

    assert_eq!(edit.applied, Money::ZERO);
    assert!(edit.clamped);
    assert_eq!(edit.state.tam.available(), rules.tam_annual);
}

#[test]
fn test_manual_tam_rejected_for_ineligible() {
    let rules = rules();
    let players = vec![senior("star", 2_500_000)];
    let state = AllocationState::full(&rules);

    let edit = state.set_manual(&players, &rules, "star", PoolKind::Tam, dollars(100_000)).unwrap();

    assert_eq!(edit.rejection, Some(EditRejection::TamIneligible));
    assert_eq!(edit.applied, Money::ZERO);
    assert_eq!(edit.state, state);
}

#[test]
fn test_manual_switch_pool_returns_other_balance() {
    let rules = rules();
    let players = vec![senior("mid", 900_000)];
    let state = reset_to_auto(&players, &rules);
    assert_eq!(state.tam.applied_to("mid"), dollars(96_875));

    let edit = state.set_manual(&players, &rules, "mid", PoolKind::Gam, dollars(40_000)).unwrap();

    assert_eq!(edit.state.gam.applied_to("mid"), dollars(40_000));
    assert_eq!(edit.state.tam.applied_to("mid"), Money::ZERO);
    assert_eq!(edit.state.tam.available(), rules.tam_annual);
    assert_eq!(edit.state.gam.available(), rules.gam_annual - dollars(40_000));
}

#[test]
fn test_manual_zero_keeps_other_pool() {
    let rules = rules();
    let players = vec![senior("mid", 900_000)];
    let state = reset_to_auto(&players, &rules);

    let edit = state.set_manual(&players, &rules, "mid", PoolKind::Gam, Money::ZERO).unwrap();

    assert!(!edit.clamped);
    assert_eq!(edit.state.tam.applied_to("mid"), dollars(96_875));
}

#[test]
fn test_manual_unknown_player() {
    let rules = rules();
    let state = AllocationState::full(&rules);
    let err = state.set_manual(&[], &rules, "ghost", PoolKind::Gam, dollars(1)).unwrap_err();
    assert_eq!(err.to_string(), "Unknown player: ghost");
}

#[test]
fn test_reset_discards_manual_edits() {
    let rules = rules();
    let players = vec![senior("mid", 900_000)];
    let auto = reset_to_auto(&players, &rules);
    let edited = auto
        .set_manual(&players, &rules, "mid", PoolKind::Gam, dollars(96_875))
        .unwrap()
        .state;
    assert_ne!(edited, auto);

    assert_eq!(reset_to_auto(&players, &rules), auto);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn roster_strategy() -> impl Strategy<Value = Vec<Player>> {
        prop::collection::vec((500_000i64..3_000_000, any::<bool>()), 1..15).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (pay, u22))| {
                    let p = Player::senior(format!("p{i}"), Money::from_dollars(pay), 21);
                    if u22 {
                        p.with_slot(RosterSlot::U22Initiative)
                    } else {
                        p
                    }
                })
                .collect()
        })
    }

    proptest! {
        /// Pool conservation: balance drop equals the amounts applied.
        #[test]
        fn prop_auto_pass_conserves_pools(
            players in roster_strategy(),
            tam in 0i64..3_000_000,
            gam in 0i64..3_000_000,
        ) {
            let rules = rules();
            let start = AllocationState::with_balances(Money::from_dollars(tam), Money::from_dollars(gam));
            let state = auto_allocate(&players, &rules, &start);

            for kind in [PoolKind::Tam, PoolKind::Gam] {
                let before = start.pool(kind);
                let after = state.pool(kind);
                prop_assert!(!after.available().is_negative());
                prop_assert_eq!(before.available() - after.available(), after.used() - before.used());
                prop_assert_eq!(after.used(), after.starting() - after.available());
            }
        }

        /// No player is bought down past the individual maximum.
        #[test]
        fn prop_charge_never_below_max(players in roster_strategy()) {
            let rules = rules();
            let state = reset_to_auto(&players, &rules);
            let plan = allocation_plan(&players, &rules, &state);
            for line in plan.lines {
                prop_assert!(line.tam + line.gam <= line.buydown_needed);
                if line.shortfall.is_zero() {
                    prop_assert_eq!(line.charge_after, rules.max_individual_charge);
                } else {
                    prop_assert!(line.charge_after > rules.max_individual_charge);
                }
            }
        }

        /// After any manual edit a player holds TAM or GAM, never both.
        #[test]
        fn prop_manual_never_comingles(
            players in roster_strategy(),
            edits in prop::collection::vec((0usize..15, any::<bool>(), 0i64..2_000_000), 1..20),
        ) {
            let rules = rules();
            let mut state = reset_to_auto(&players, &rules);
            for (idx, tam, amount) in edits {
                let id = players[idx % players.len()].id.clone();
                let pool = if tam { PoolKind::Tam } else { PoolKind::Gam };
                let edit = state
                    .set_manual(&players, &rules, &id, pool, Money::from_dollars(amount))
                    .unwrap();
                state = edit.state;
                if edit.rejection.is_none() && edit.applied.is_positive() {
                    prop_assert!(state.pool(pool.other()).applied_to(&id).is_zero());
                }
                prop_assert!(!state.tam.available().is_negative());
                prop_assert!(!state.gam.available().is_negative());
                prop_assert_eq!(state.tam.used(), state.tam.starting() - state.tam.available());
                prop_assert_eq!(state.gam.used(), state.gam.starting() - state.gam.available());
            }
        }
    }
}
