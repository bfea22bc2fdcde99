pub mod money;
pub mod player;

pub use money::Money;
pub use player::{
    validate_roster, AcquisitionTerms, Designation, Player, PlayerRecord, RosterSlot, RosterTier,
    SeniorDesignation, SupplementalDesignation,
};
