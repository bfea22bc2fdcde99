//! Roster compliance checker
//!
//! Aggregates every player's post-buydown charge and slot usage against the
//! season's limits.

use super::allocation::{reset_to_auto, AllocationState};
use super::charge::{charge_of, ChargeBasis};
use super::issue::{Gap, Issue, IssueKind};
use crate::data::SeasonRules;
use crate::models::{Designation, Money, Player, RosterTier};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUsage {
    pub used: u16,
    pub max: u16,
}

impl SlotUsage {
    pub fn new(used: usize, max: u16) -> Self {
        SlotUsage { used: u16::try_from(used).unwrap_or(u16::MAX), max }
    }

    pub fn is_within(&self) -> bool {
        self.used <= self.max
    }

    pub fn has_room(&self) -> bool {
        self.used < self.max
    }

    pub fn over_by(&self) -> u16 {
        self.used.saturating_sub(self.max)
    }

    pub fn free(&self) -> u16 {
        self.max.saturating_sub(self.used)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotReport {
    pub senior_roster: SlotUsage,
    pub supplemental_roster: SlotUsage,
    pub designated_players: SlotUsage,
    pub u22: SlotUsage,
    pub international: SlotUsage,
}

impl SlotReport {
    pub fn count(players: &[Player], rules: &SeasonRules) -> Self {
        let mut senior = 0;
        let mut supplemental = 0;
        let mut dp = 0;
        let mut u22 = 0;
        let mut international = 0;
        for player in players {
            match player.tier() {
                RosterTier::Senior => senior += 1,
                RosterTier::Supplemental => supplemental += 1,
            }
            match player.designation() {
                Designation::DesignatedPlayer => dp += 1,
                Designation::U22 if charge_of(player, rules).basis.counts_u22_slot() => u22 += 1,
                _ => {}
            }
            if player.international {
                international += 1;
            }
        }
        SlotReport {
            senior_roster: SlotUsage::new(senior, rules.max_senior_roster_size),
            supplemental_roster: SlotUsage::new(supplemental, rules.max_supplemental_roster_size),
            designated_players: SlotUsage::new(dp, rules.max_dp_slots),
            u22: SlotUsage::new(u22, rules.max_u22_slots),
            international: SlotUsage::new(international, rules.max_international_slots),
        }
    }
}

/// One player's charge after allocation money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerChargeLine {
    pub player_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub designation: Designation,
    pub tier: RosterTier,
    pub basis: ChargeBasis,
    pub raw_charge: Money,
    pub tam: Money,
    pub gam: Money,
    /// Budget charge after buydown; zero for supplemental players.
    pub charge: Money,
    pub shortfall: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub year: u16,
    pub total_budget_charge: Money,
    pub cap_space_remaining: Money,
    pub slots: SlotReport,
    pub is_compliant: bool,
    pub buydown_shortfall: Money,
    pub players: Vec<PlayerChargeLine>,
    pub issues: Vec<Issue>,
}

/// Compliance of `players` with `allocations` already applied.
pub fn evaluate(
    players: &[Player],
    rules: &SeasonRules,
    allocations: &AllocationState,
) -> ComplianceReport {
    let slots = SlotReport::count(players, rules);
    let mut issues = Vec::new();

    let mut lines = Vec::with_capacity(players.len());
    for player in players {
        let charge = charge_of(player, rules);
        let tam = allocations.tam.applied_to(&player.id);
        let gam = allocations.gam.applied_to(&player.id);
        let post_buydown = charge.charge_after(tam + gam);
        let shortfall = charge.buydown_needed(rules).saturating_sub_floor(tam + gam);
        lines.push(PlayerChargeLine {
            player_id: player.id.clone(),
            name: player.name.clone(),
            designation: player.designation(),
            tier: player.tier(),
            basis: charge.basis,
            raw_charge: charge.raw_charge,
            tam,
            gam,
            charge: post_buydown,
            shortfall,
        });
    }

    let senior_lines = || lines.iter().filter(|l| l.tier == RosterTier::Senior);
    let total_budget_charge: Money = senior_lines().map(|l| l.charge).sum();
    let cap_space_remaining = rules.salary_budget - total_budget_charge;
    let buydown_shortfall: Money = senior_lines().map(|l| l.shortfall).sum();

    let slot_checks = [
        (slots.senior_roster, IssueKind::SeniorRosterFull, "Senior roster over limit"),
        (slots.supplemental_roster, IssueKind::SupplementalRosterFull, "Supplemental roster over limit"),
        (slots.designated_players, IssueKind::DpSlotsFull, "Too many Designated Players"),
        (slots.u22, IssueKind::U22SlotsFull, "Too many U22 Initiative players"),
        (slots.international, IssueKind::InternationalSlotsFull, "Too many international players"),
    ];
    for (usage, kind, label) in slot_checks {
        if !usage.is_within() {
            issues.push(Issue::blocking(
                kind,
                format!("{label}: {} of {}", usage.used, usage.max),
                Some(Gap::Slots(usage.over_by())),
            ));
        }
    }

    if cap_space_remaining.is_negative() {
        issues.push(Issue::blocking(
            IssueKind::OverBudget,
            format!(
                "Total budget charge {} exceeds salary budget {}",
                total_budget_charge, rules.salary_budget
            ),
            Some(Gap::Dollars(-cap_space_remaining)),
        ));
    }

    let mut over_max = false;
    for line in senior_lines().filter(|l| !l.basis.is_fixed()) {
        if line.charge > rules.max_individual_charge {
            over_max = true;
            issues.push(Issue::blocking(
                IssueKind::ChargeOverMaximum,
                format!(
                    "{} charges {} against a maximum of {}",
                    line.name.as_deref().unwrap_or(&line.player_id),
                    line.charge,
                    rules.max_individual_charge
                ),
                Some(Gap::Dollars(line.charge - rules.max_individual_charge)),
            ));
        }
    }

    let slots_ok = [
        slots.senior_roster,
        slots.supplemental_roster,
        slots.designated_players,
        slots.u22,
        slots.international,
    ]
    .iter()
    .all(SlotUsage::is_within);
    let is_compliant = slots_ok && !cap_space_remaining.is_negative() && !over_max;

    debug!(
        year = rules.year,
        total = %total_budget_charge,
        space = %cap_space_remaining,
        shortfall = %buydown_shortfall,
        is_compliant,
        "roster evaluated"
    );

    ComplianceReport {
        year: rules.year,
        total_budget_charge,
        cap_space_remaining,
        slots,
        is_compliant,
        buydown_shortfall,
        players: lines,
        issues,
    }
}

/// Compliance after a fresh automatic allocation pass.
pub fn check_roster(players: &[Player], rules: &SeasonRules) -> (ComplianceReport, AllocationState) {
    let allocations = reset_to_auto(players, rules);
    (evaluate(players, rules, &allocations), allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeasonRuleTable;
    use crate::models::{RosterSlot, SupplementalDesignation};

    fn rules() -> SeasonRules {
        SeasonRuleTable::embedded().get(2026).unwrap().clone()
    }

    fn dollars(d: i64) -> Money {
        Money::from_dollars(d)
    }

    fn base_roster() -> Vec<Player> {
        let mut players = vec![
            Player::senior("dp1", dollars(5_000_000), 30).with_slot(RosterSlot::DesignatedPlayer),
            Player::senior("u22a", dollars(450_000), 19).with_slot(RosterSlot::U22Initiative),
        ];
        for i in 0..10 {
            players.push(Player::senior(format!("s{i}"), dollars(300_000), 26));
        }
        players.push(
            Player::senior("hg", dollars(90_000), 17)
                .with_slot(RosterSlot::Supplemental(SupplementalDesignation::Homegrown)),
        );
        players
    }

    #[test]
    fn test_compliant_roster() {
        let rules = rules();
        let (report, _) = check_roster(&base_roster(), &rules);

        // 803,125 DP + 200,000 U22 + 10 x 300,000
        assert_eq!(report.total_budget_charge, dollars(4_003_125));
        assert_eq!(report.cap_space_remaining, dollars(6_425_000 - 4_003_125));
        assert_eq!(report.slots.senior_roster, SlotUsage { used: 12, max: 20 });
        assert_eq!(report.slots.supplemental_roster.used, 1);
        assert_eq!(report.slots.designated_players.used, 1);
        assert_eq!(report.slots.u22.used, 1);
        assert!(report.is_compliant);
        assert_eq!(report.buydown_shortfall, Money::ZERO);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_buydown_brings_player_into_compliance() {
        let rules = rules();
        let mut players = base_roster();
        players.push(Player::senior("mid", dollars(900_000), 27));

        let (report, allocations) = check_roster(&players, &rules);

        assert!(report.is_compliant);
        let line = report.players.iter().find(|l| l.player_id == "mid").unwrap();
        assert_eq!(line.tam, dollars(96_875));
        assert_eq!(line.charge, rules.max_individual_charge);
        assert_eq!(allocations.tam.available(), rules.tam_annual - dollars(96_875));
    }

    #[test]
    fn test_without_buydown_reports_shortfall() {
        let rules = rules();
        let players = vec![Player::senior("mid", dollars(900_000), 27)];

        let report = evaluate(&players, &rules, &AllocationState::with_balances(Money::ZERO, Money::ZERO));

        assert!(!report.is_compliant);
        assert_eq!(report.buydown_shortfall, dollars(96_875));
        let issue = &report.issues[0];
        assert_eq!(issue.kind, IssueKind::ChargeOverMaximum);
        assert_eq!(issue.gap, Some(Gap::Dollars(dollars(96_875))));
    }

    #[test]
    fn test_dp_slot_overflow() {
        let rules = rules();
        let mut players = base_roster();
        for i in 0..3 {
            players.push(
                Player::senior(format!("dpx{i}"), dollars(2_000_000), 30)
                    .with_slot(RosterSlot::DesignatedPlayer),
            );
        }

        let (report, _) = check_roster(&players, &rules);

        assert!(!report.is_compliant);
        assert_eq!(report.slots.designated_players, SlotUsage { used: 4, max: 3 });
        let issue = report.issues.iter().find(|i| i.kind == IssueKind::DpSlotsFull).unwrap();
        assert_eq!(issue.gap, Some(Gap::Slots(1)));
    }

    #[test]
    fn test_over_budget() {
        let rules = rules();
        let players: Vec<Player> =
            (0..9).map(|i| Player::senior(format!("s{i}"), dollars(800_000), 28)).collect();

        let (report, _) = check_roster(&players, &rules);

        assert_eq!(report.total_budget_charge, dollars(7_200_000));
        assert_eq!(report.cap_space_remaining, dollars(-775_000));
        assert!(!report.is_compliant);
        let issue = report.issues.iter().find(|i| i.kind == IssueKind::OverBudget).unwrap();
        assert_eq!(issue.gap, Some(Gap::Dollars(dollars(775_000))));
    }

    #[test]
    fn test_supplemental_charge_excluded_from_budget() {
        let rules = rules();
        let players = vec![Player::senior("supp", dollars(2_000_000), 18)
            .with_slot(RosterSlot::Supplemental(SupplementalDesignation::Supplemental))];

        let (report, allocations) = check_roster(&players, &rules);

        assert_eq!(report.total_budget_charge, Money::ZERO);
        assert!(report.is_compliant);
        assert!(allocations.gam.used_by().is_empty());
    }

    #[test]
    fn test_ineligible_u22_takes_no_u22_slot() {
        let rules = rules();
        let players = vec![
            Player::senior("old", dollars(400_000), 25).with_slot(RosterSlot::U22Initiative),
        ];

        let (report, _) = check_roster(&players, &rules);

        assert_eq!(report.slots.u22.used, 0);
        assert_eq!(report.players[0].basis, ChargeBasis::U22Downgraded);
        assert_eq!(report.total_budget_charge, dollars(400_000));
    }

    #[test]
    fn test_international_overflow() {
        let rules = rules();
        let players: Vec<Player> = (0..9)
            .map(|i| Player::senior(format!("i{i}"), dollars(200_000), 24).international())
            .collect();

        let (report, _) = check_roster(&players, &rules);

        assert!(!report.is_compliant);
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::InternationalSlotsFull && i.gap == Some(Gap::Slots(1))));
    }

    #[test]
    fn test_fixed_charges_exempt_from_individual_maximum() {
        let mut rules = rules();
        rules.dp_charge = rules.max_individual_charge + dollars(100_000);
        rules.u22_charge = rules.max_individual_charge + dollars(50_000);
        let players = vec![
            Player::senior("dp1", dollars(4_000_000), 30).with_slot(RosterSlot::DesignatedPlayer),
            Player::senior("u1", dollars(400_000), 20).with_slot(RosterSlot::U22Initiative),
        ];

        let (report, _) = check_roster(&players, &rules);

        assert_eq!(report.players[0].charge, dollars(903_125));
        assert!(report.issues.iter().all(|i| i.kind != IssueKind::ChargeOverMaximum));
        assert!(report.is_compliant);
    }
}
