use thiserror::Error;

/// Errors that stop an evaluation before it starts.
///
/// Cap and slot shortfalls are never errors; they come back as regular
/// results carrying issues and gaps. Only malformed input lands here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapError {
    #[error("Invalid player {player_id}: {reason}")]
    InvalidPlayer { player_id: String, reason: String },

    #[error("Duplicate player id: {0}")]
    DuplicatePlayer(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Invalid amount for {field}: {value}")]
    InvalidAmount { field: String, value: String },

    #[error("Invalid sale terms: {0}")]
    InvalidSaleTerms(String),

    #[error("No season rules for year {year} (available: {available})")]
    UnknownSeason { year: u16, available: String },

    #[error("Invalid season rules for {year}: {reason}")]
    InvalidRules { year: u16, reason: String },

    #[error("Rule table parse error: {0}")]
    RuleTableParse(String),

    #[error("Rule table IO error: {0}")]
    RuleTableIo(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CapError {
    pub(crate) fn invalid_player(player_id: &str, reason: impl Into<String>) -> Self {
        CapError::InvalidPlayer { player_id: player_id.to_string(), reason: reason.into() }
    }

    /// True when the error was caused by caller-supplied data rather than
    /// the rule table the engine was configured with.
    pub fn is_input_violation(&self) -> bool {
        match self {
            CapError::InvalidPlayer { .. } => true,
            CapError::DuplicatePlayer(_) => true,
            CapError::UnknownPlayer(_) => true,
            CapError::InvalidAmount { .. } => true,
            CapError::InvalidSaleTerms(_) => true,
            CapError::InvalidRequest(_) => true,
            CapError::UnknownSeason { .. } => true,
            CapError::InvalidRules { .. } => false,
            CapError::RuleTableParse(_) => false,
            CapError::RuleTableIo(_) => false,
        }
    }
}

impl From<serde_json::Error> for CapError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        if err.is_data() && message.contains(crate::models::money::OUT_OF_RANGE) {
            return CapError::InvalidAmount { field: "amount".to_string(), value: message };
        }
        CapError::InvalidRequest(message)
    }
}

pub type Result<T> = std::result::Result<T, CapError>;
