//! Cap rules engine
//!
//! Data flows one way: season rules feed the charge calculator, whose
//! output drives the compliance checker and the allocator; the signing
//! evaluator runs both as subroutines. The sale calculator stands alone.

pub mod allocation;
pub mod charge;
pub mod compliance;
pub mod issue;
pub mod sale;
pub mod signing;

#[cfg(test)]
mod allocation_test;

pub use allocation::{
    allocation_plan, auto_allocate, is_tam_eligible, reset_to_auto, AllocationLine,
    AllocationMode, AllocationPlan, AllocationPool, AllocationState, EditRejection, ManualEdit,
    PoolKind, PoolSummary,
};
pub use charge::{charge_of, ChargeBasis, ChargeBreakdown};
pub use compliance::{
    check_roster, evaluate as evaluate_roster, ComplianceReport, PlayerChargeLine, SlotReport,
    SlotUsage,
};
pub use issue::{Gap, Issue, IssueKind};
pub use sale::{gam_from_sale, BonusReason, SaleAllocation, SaleBonus, SaleTerms, SaleTier, TierSlice};
pub use signing::{
    evaluate as evaluate_signing, BuydownSplit, RequestedDesignation, RequestedOutcome,
    RosterState, SigningCandidate, SigningDesignation, SigningVerdict,
};
