//! Error types for tournament import

/// Failure to turn tournament records into a bracket
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("participant {participant} referenced by match {match_id} was not found")]
    UnknownParticipant { match_id: String, participant: String },

    #[error("match {match_id} references unknown match {reference}")]
    UnknownMatch { match_id: String, reference: String },

    #[error("match {match_id} has no player{slot} slot")]
    MissingSlot { match_id: String, slot: u8 },

    #[error("no final match found")]
    NoFinal,

    #[error("malformed tournament data: {0}")]
    Malformed(String),

    #[error("invalid tournament JSON: {0}")]
    Json(#[from] serde_json::Error),
}
