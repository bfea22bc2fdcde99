use crate::models::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    SeniorRosterFull,
    SupplementalRosterFull,
    NoRosterSpot,
    DpSlotsFull,
    U22SlotsFull,
    InternationalSlotsFull,
    OverBudget,
    ChargeOverMaximum,
    InsufficientAllocationMoney,
    CannotFitPlayer,
    BelowMinimumSalary,
    RequestedDesignationUnavailable,
}

/// How far a constraint is from being met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "snake_case")]
pub enum Gap {
    Dollars(Money),
    Slots(u16),
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gap::Dollars(amount) => write!(f, "{} short", amount),
            Gap::Slots(1) => write!(f, "1 slot short"),
            Gap::Slots(n) => write!(f, "{} slots short", n),
        }
    }
}

/// A human-readable reason attached to a verdict.
///
/// Blocking issues make a roster non-compliant or a signing impossible;
/// the rest are advisory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<Gap>,
    pub blocking: bool,
}

impl Issue {
    pub fn blocking(kind: IssueKind, message: impl Into<String>, gap: Option<Gap>) -> Self {
        Issue { kind, message: message.into(), gap, blocking: true }
    }

    pub fn advisory(kind: IssueKind, message: impl Into<String>) -> Self {
        Issue { kind, message: message.into(), gap: None, blocking: false }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gap {
            Some(gap) => write!(f, "{} ({})", self.message, gap),
            None => f.write_str(&self.message),
        }
    }
}
