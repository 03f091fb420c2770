//! Discussion history
//!
//! The history is the single source of truth for a consultation: prompts are
//! built from it and presenters render it. It is append-only, except for the
//! transient typing placeholder inserted by [`DiscussionHistory::begin_turn`].

use crate::voting::record::VoteRecord;
use serde::{Deserialize, Serialize};

/// One entry of the discussion transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    /// Workflow announcements and diagnostics
    System { content: String },
    /// A message typed in by the patient
    Patient { author: String, content: String },
    /// A panel member's turn, or the error recorded in its place
    Doctor {
        doctor_id: String,
        doctor_name: String,
        content: String,
    },
    /// A single cast vote
    VoteDetail(VoteRecord),
    /// Outcome of a tally
    VoteResult { content: String },
}

impl Entry {
    pub fn system(content: impl Into<String>) -> Self {
        Entry::System {
            content: content.into(),
        }
    }

    pub fn doctor(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Entry::Doctor {
            doctor_id: id.into(),
            doctor_name: name.into(),
            content: content.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Entry::System { .. } => "system",
            Entry::Patient { .. } => "patient",
            Entry::Doctor { .. } => "doctor",
            Entry::VoteDetail(_) => "vote_detail",
            Entry::VoteResult { .. } => "vote_result",
        }
    }

    /// Display name of whoever authored the entry
    pub fn author(&self) -> Option<&str> {
        match self {
            Entry::Patient { author, .. } => Some(author),
            Entry::Doctor { doctor_name, .. } => Some(doctor_name),
            Entry::VoteDetail(vote) => Some(&vote.voter_name),
            Entry::System { .. } | Entry::VoteResult { .. } => None,
        }
    }

    /// Text content, with vote details rendered as a sentence
    pub fn content(&self) -> String {
        match self {
            Entry::System { content }
            | Entry::Patient { content, .. }
            | Entry::Doctor { content, .. }
            | Entry::VoteResult { content } => content.clone(),
            Entry::VoteDetail(vote) => format!(
                "{} marked {} as least accurate: {}",
                vote.voter_name, vote.target_name, vote.reason
            ),
        }
    }

    /// Id of the authoring agent, for doctor entries
    pub fn doctor_id(&self) -> Option<&str> {
        match self {
            Entry::Doctor { doctor_id, .. } => Some(doctor_id),
            _ => None,
        }
    }
}

/// Append-only discussion transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscussionHistory {
    entries: Vec<Entry>,
    #[serde(skip)]
    placeholder: Option<usize>,
}

impl DiscussionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its index
    pub fn push(&mut self, entry: Entry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn push_system(&mut self, content: impl Into<String>) -> usize {
        self.push(Entry::system(content))
    }

    pub fn push_patient(&mut self, author: impl Into<String>, content: impl Into<String>) -> usize {
        self.push(Entry::Patient {
            author: author.into(),
            content: content.into(),
        })
    }

    pub fn push_vote_detail(&mut self, vote: VoteRecord) -> usize {
        self.push(Entry::VoteDetail(vote))
    }

    pub fn push_vote_result(&mut self, content: impl Into<String>) -> usize {
        self.push(Entry::VoteResult {
            content: content.into(),
        })
    }

    /// Insert the "is typing" placeholder for an agent's turn.
    ///
    /// Any placeholder left over from an earlier turn is dropped first.
    pub fn begin_turn(&mut self, agent_name: &str) -> usize {
        self.clear_placeholder();
        let idx = self.push_system(format!("{} is typing...", agent_name));
        self.placeholder = Some(idx);
        idx
    }

    /// Replace the placeholder with the agent's response
    pub fn commit_turn(&mut self, agent_id: &str, agent_name: &str, text: impl Into<String>) -> usize {
        self.clear_placeholder();
        self.push(Entry::doctor(agent_id, agent_name, text))
    }

    /// Replace the placeholder with a doctor-authored error entry
    pub fn fail_turn(&mut self, agent_id: &str, agent_name: &str, message: &str) -> usize {
        self.clear_placeholder();
        self.push(Entry::doctor(
            agent_id,
            agent_name,
            format!("Call to {} failed: {}", agent_name, message),
        ))
    }

    /// Drop the placeholder without recording anything
    pub fn cancel_turn(&mut self) {
        self.clear_placeholder();
    }

    fn clear_placeholder(&mut self) {
        if let Some(idx) = self.placeholder.take()
            && idx < self.entries.len()
        {
            self.entries.remove(idx);
        }
    }

    pub fn has_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// All entries, including a pending placeholder
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries excluding the typing placeholder
    pub fn settled(&self) -> impl Iterator<Item = &Entry> {
        let skip = self.placeholder;
        self.entries
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != skip)
            .map(|(_, e)| e)
    }

    /// The last `n` settled entries, oldest first
    pub fn tail(&self, n: usize) -> Vec<&Entry> {
        let settled: Vec<&Entry> = self.settled().collect();
        let start = settled.len().saturating_sub(n);
        settled[start..].to_vec()
    }

    pub fn get(&self, idx: usize) -> Option<&Entry> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }
}
