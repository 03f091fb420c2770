//! Vote records

use serde::{Deserialize, Serialize};

/// One cast vote naming the weakest contributor of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub round: u32,
    pub voter_id: String,
    pub voter_name: String,
    pub target_id: String,
    pub target_name: String,
    pub reason: String,
}

impl VoteRecord {
    pub fn is_self_vote(&self) -> bool {
        self.voter_id == self.target_id
    }
}
