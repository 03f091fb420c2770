//! Vote response parsing.
//!
//! Agents are asked to answer with `{"targetDoctorId": "...", "reason": "..."}`
//! but model output is rarely that clean. Parsing runs an ordered chain of
//! independent strategies; the first one that yields a decision wins.
//!
//! | Order | Strategy | Accepts |
//! |-------|----------|---------|
//! | 1 | [`parse_targeted_fragment`] | any `{...}` fragment mentioning `targetDoctorId` |
//! | 2 | [`parse_brace_span`] | the first `{` to the last `}` of the whole text |
//! | 3 | [`match_keywords`] | agent ids / names mentioned in free text |
//!
//! A candidate that parses as JSON ends the chain even when its target is
//! missing or not a string; keyword matching only runs when no JSON parsed.
//! When every strategy declines, [`parse_vote`] returns the unparsed sentinel.
//! An empty target either way becomes a self-vote in the engine.

use crate::agent::entities::Agent;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// JSON field carrying the vote target
pub const TARGET_FIELD: &str = "targetDoctorId";

static FENCE_LANG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```json").expect("valid regex"));
static FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("valid regex"));
static TARGET_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)targetDoctorId").expect("valid regex"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("valid regex"));

/// Which strategy produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Fragment,
    BraceSpan,
    Keyword,
    Unparsed,
}

/// A parsed vote decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteDecision {
    /// Target agent id; empty for the unparsed sentinel
    pub target: String,
    pub reason: String,
    pub source: DecisionSource,
}

impl VoteDecision {
    fn unparsed() -> Self {
        Self {
            target: String::new(),
            reason: "Output did not follow the requested JSON format".to_string(),
            source: DecisionSource::Unparsed,
        }
    }

    /// Whether the parser produced a target at all
    pub fn has_target(&self) -> bool {
        !self.target.is_empty()
    }
}

type Strategy = fn(&str, &[Agent]) -> Option<VoteDecision>;

const STRATEGIES: [Strategy; 3] = [parse_targeted_fragment, parse_brace_span, match_keywords];

/// Parse a vote response against the agents eligible as targets.
pub fn parse_vote(response: &str, candidates: &[Agent]) -> VoteDecision {
    let cleaned = strip_fences(response);
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(&cleaned, candidates))
        .unwrap_or_else(VoteDecision::unparsed)
}

fn strip_fences(text: &str) -> String {
    FENCE_LANG.replace_all(text, "```").replace("```", "")
}

/// Light repair of almost-JSON: trailing commas and single quotes.
fn repair(candidate: &str) -> String {
    TRAILING_COMMA.replace_all(candidate, "}").replace('\'', "\"")
}

fn decision_from_json(candidate: &str, source: DecisionSource) -> Option<VoteDecision> {
    let value: Value = serde_json::from_str(&repair(candidate)).ok()?;
    let target = value
        .get(TARGET_FIELD)
        .and_then(Value::as_str)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    let reason = match value.get("reason") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    Some(VoteDecision {
        target,
        reason,
        source,
    })
}

/// Strategy 1: brace fragments that mention the target field.
pub fn parse_targeted_fragment(text: &str, _candidates: &[Agent]) -> Option<VoteDecision> {
    FRAGMENT
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|fragment| TARGET_KEY.is_match(fragment))
        .find_map(|fragment| decision_from_json(fragment, DecisionSource::Fragment))
}

/// Strategy 2: everything between the first `{` and the last `}`.
pub fn parse_brace_span(text: &str, _candidates: &[Agent]) -> Option<VoteDecision> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    decision_from_json(&text[start..=end], DecisionSource::BraceSpan)
}

/// Strategy 3: count mentions of each candidate's id and name.
///
/// Each candidate is scored by how often its id, lower-cased name and
/// whitespace-free name occur in the text, both as written and with
/// whitespace and colons removed. Highest score wins; ties keep the earlier
/// candidate.
pub fn match_keywords(text: &str, candidates: &[Agent]) -> Option<VoteDecision> {
    let lower = text.to_lowercase();
    let compressed: String = lower
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '：')
        .collect();

    let mut best: Option<(&Agent, usize)> = None;
    for agent in candidates {
        let name = agent.name.to_lowercase();
        let variants = [
            agent.id.to_lowercase(),
            name.clone(),
            name.split_whitespace().collect::<String>(),
        ];
        let score: usize = variants
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| lower.matches(v.as_str()).count() + compressed.matches(v.as_str()).count())
            .sum();
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((agent, score));
        }
    }

    best.map(|(agent, _)| VoteDecision {
        target: agent.id.clone(),
        reason: "Non-JSON output, matched by keywords in the text".to_string(),
        source: DecisionSource::Keyword,
    })
}
