//! Vote model and the vote transition rules

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vote type, a closed two-value enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "vote_type", rename_all = "UPPERCASE")]
pub enum VoteType {
    Like,
    Hate,
}

/// Vote entity, at most one per (user, movie)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub user_id: Uuid,
    pub vote_type: VoteType,
}

/// The single row mutation produced by a vote request.
///
/// | existing \ requested | LIKE          | HATE          |
/// |----------------------|---------------|---------------|
/// | none                 | cast LIKE     | cast HATE     |
/// | LIKE                 | retract       | flip to HATE  |
/// | HATE                 | flip to LIKE  | retract       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    /// Insert a new vote row
    Cast(VoteType),
    /// Update the type of the existing row in place
    Flip { from: VoteType, to: VoteType },
    /// Delete the existing row
    Retract(VoteType),
}

impl VoteChange {
    /// Decide the mutation for `requested` given the user's current vote
    pub fn plan(existing: Option<VoteType>, requested: VoteType) -> Self {
        match existing {
            None => VoteChange::Cast(requested),
            Some(current) if current == requested => VoteChange::Retract(current),
            Some(current) => VoteChange::Flip {
                from: current,
                to: requested,
            },
        }
    }
}

#[cfg(test)]
impl VoteChange {
    /// The user's vote once the change is applied
    pub fn resulting_vote(&self) -> Option<VoteType> {
        match self {
            VoteChange::Cast(vote_type) => Some(*vote_type),
            VoteChange::Flip { to, .. } => Some(*to),
            VoteChange::Retract(_) => None,
        }
    }
}

/// Query parameters for casting a vote
#[derive(Debug, Clone, Deserialize)]
pub struct VoteQuery {
    #[serde(rename = "type")]
    pub vote_type: VoteType,
}
