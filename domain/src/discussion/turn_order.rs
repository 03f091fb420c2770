//! Turn order generation

use crate::agent::entities::Agent;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How speakers are ordered within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOrder {
    /// Fresh uniform shuffle every round
    #[default]
    Random,
    /// Declared agent order, every round
    Fixed,
}

impl TurnOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOrder::Random => "random",
            TurnOrder::Fixed => "fixed",
        }
    }
}

impl FromStr for TurnOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" | "shuffle" => Ok(TurnOrder::Random),
            "fixed" | "round-robin" | "round_robin" => Ok(TurnOrder::Fixed),
            other => Err(format!("unknown turn order: {}", other)),
        }
    }
}

/// Build the turn queue for a round from the currently active agents.
pub fn generate_turn_queue<R: Rng + ?Sized>(
    agents: &[Agent],
    order: TurnOrder,
    rng: &mut R,
) -> Vec<String> {
    let mut queue: Vec<String> = agents
        .iter()
        .filter(|a| a.is_active())
        .map(|a| a.id.clone())
        .collect();
    if order == TurnOrder::Random {
        queue.shuffle(rng);
    }
    queue
}
