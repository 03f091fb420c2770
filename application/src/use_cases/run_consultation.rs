//! Run Consultation use case
//!
//! [`ConsultationEngine`] owns one consultation session and drives it through
//! discussion rounds, voting and elimination until an end condition holds,
//! then requests the final summary.
//!
//! Turns and votes run strictly one after another. The engine suspends only
//! while waiting out a pause, while a provider call is in flight (bounded by
//! the call timeout), and between reveal steps.

use crate::config::ExecutionParams;
use crate::ports::agent_gateway::{AgentGateway, GatewayError};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::knowledge_source::{KnowledgeSource, NoKnowledge};
use crate::ports::progress::{DiscussionObserver, NoProgress};
use crate::use_cases::final_summary::{FinalSummaryProducer, SummaryRequest};
use crate::use_cases::shared::{call_with_timeout, fetch_context};
use consilium_domain::core::string::take_chars;
use consilium_domain::discussion::turn_order::generate_turn_queue;
use consilium_domain::prompt::context::{case_query_text, provider_history};
use consilium_domain::voting::resolve::{ResolvedVote, resolve_vote, simulated_self_vote};
use consilium_domain::voting::tally::{apply_votes, tally};
use consilium_domain::{
    Agent, Case, ConsultationSettings, DiscussionHistory, DomainError, Entry, FinalSummary,
    FinishReason, ImageFinding, LinkedCase, Phase, PromptContext, PromptTemplate, RetrievedEntry,
    TallyOutcome, VoteRecord, WorkflowState, check_end_conditions, parse_vote,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Characters of an unparseable vote reply kept in the diagnostic entry
const VOTE_DIAGNOSTIC_CHARS: usize = 200;

/// Errors that end a consultation early
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsultError {
    #[error("Invalid consultation: {0}")]
    Validation(#[from] DomainError),

    #[error("Consultation cancelled")]
    Cancelled,
}

/// How a completed consultation ended
#[derive(Debug, Clone, PartialEq)]
pub struct ConsultationOutcome {
    pub rounds: u32,
    pub reason: FinishReason,
    pub summary: FinalSummary,
}

/// Shared pause switch for a running consultation.
///
/// Cloned handles control the same engine from other tasks.
#[derive(Clone)]
pub struct PauseHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl PauseHandle {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn pause(&self) {
        self.tx.send_replace(true);
    }

    pub fn resume(&self) {
        self.tx.send_replace(false);
    }

    pub fn toggle(&self) {
        self.tx.send_modify(|paused| *paused = !*paused);
    }

    pub fn is_paused(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for PauseHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// One consultation session
pub struct ConsultationEngine<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    knowledge: Arc<dyn KnowledgeSource>,
    observer: Arc<dyn DiscussionObserver>,
    logger: Arc<dyn ConversationLogger>,
    params: ExecutionParams,
    pause: PauseHandle,
    cancel: CancellationToken,

    consultation_name: String,
    case: Case,
    agents: Vec<Agent>,
    settings: ConsultationSettings,
    linked_cases: Vec<LinkedCase>,
    selected_knowledge: Vec<String>,
    history: DiscussionHistory,
    workflow: WorkflowState,
    round_votes: Vec<VoteRecord>,
    last_success: Option<String>,
    summary: FinalSummary,
}

impl<G: AgentGateway + 'static> ConsultationEngine<G> {
    pub fn new(gateway: Arc<G>, params: ExecutionParams) -> Self {
        Self {
            gateway,
            knowledge: Arc::new(NoKnowledge),
            observer: Arc::new(NoProgress),
            logger: Arc::new(NoConversationLogger),
            params,
            pause: PauseHandle::new(),
            cancel: CancellationToken::new(),
            consultation_name: String::new(),
            case: Case::default(),
            agents: Vec::new(),
            settings: ConsultationSettings::default(),
            linked_cases: Vec::new(),
            selected_knowledge: Vec::new(),
            history: DiscussionHistory::new(),
            workflow: WorkflowState::new(),
            round_votes: Vec::new(),
            last_success: None,
            summary: FinalSummary::default(),
        }
    }

    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeSource>) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn DiscussionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    // ==================== Accessors ====================

    pub fn consultation_name(&self) -> &str {
        &self.consultation_name
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn active_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.is_active())
    }

    pub fn settings(&self) -> &ConsultationSettings {
        &self.settings
    }

    pub fn linked_cases(&self) -> &[LinkedCase] {
        &self.linked_cases
    }

    pub fn selected_knowledge(&self) -> &[String] {
        &self.selected_knowledge
    }

    pub fn history(&self) -> &DiscussionHistory {
        &self.history
    }

    pub fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    /// Votes cast in the most recent voting phase
    pub fn round_votes(&self) -> &[VoteRecord] {
        &self.round_votes
    }

    pub fn summary(&self) -> &FinalSummary {
        &self.summary
    }

    pub fn pause_handle(&self) -> PauseHandle {
        self.pause.clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ==================== Session Setup ====================

    pub fn set_consultation_name(&mut self, name: &str) {
        self.consultation_name = name.trim().to_string();
    }

    pub fn set_case(&mut self, case: Case) {
        self.case = case;
    }

    pub fn set_image_findings(&mut self, findings: Vec<ImageFinding>) {
        self.case.set_image_findings(findings);
    }

    pub fn set_agents(&mut self, agents: Vec<Agent>) {
        self.agents = agents;
    }

    pub fn set_settings(&mut self, settings: ConsultationSettings) {
        self.settings = settings;
    }

    /// Attach earlier consultations.
    ///
    /// With `sync_patient_info`, the first linked case's non-empty patient
    /// name and gender, and its age, replace the current case's.
    pub fn set_linked_cases(&mut self, list: Vec<LinkedCase>, sync_patient_info: bool) {
        self.linked_cases = consilium_domain::case::entities::normalize_linked_cases(list);
        if !sync_patient_info {
            return;
        }
        if let Some(first) = self.linked_cases.first() {
            let name = first.patient_name.trim();
            if !name.is_empty() {
                self.case.name = name.to_string();
            }
            let gender = first.patient_gender.trim();
            if !gender.is_empty() {
                self.case.gender = gender.to_string();
            }
            self.case.age = first.patient_age;
        }
    }

    /// Restrict retrieval to these documents; duplicates and blanks are dropped
    pub fn set_selected_knowledge(&mut self, ids: Vec<String>) {
        let mut selected: Vec<String> = Vec::new();
        for id in ids {
            if !id.is_empty() && !selected.contains(&id) {
                selected.push(id);
            }
        }
        self.selected_knowledge = selected;
    }

    /// Append a patient-authored message; blank text is ignored
    pub fn add_patient_message(&mut self, text: &str) {
        let content = text.trim();
        if content.is_empty() {
            return;
        }
        let idx = self.history.push_patient(self.case.patient_label(), content);
        self.notify_entry(idx);
    }

    // ==================== Pause Control ====================

    pub fn pause(&self) {
        self.pause.pause();
    }

    pub fn resume(&self) {
        self.pause.resume();
    }

    pub fn toggle_pause(&self) {
        self.pause.toggle();
    }

    /// Discard a cancelled or finished session so a new one can start
    pub fn reset_session(&mut self) {
        self.history = DiscussionHistory::new();
        self.workflow = WorkflowState::new();
        self.round_votes.clear();
        self.last_success = None;
        self.summary = FinalSummary::default();
        for agent in &mut self.agents {
            agent.reset();
        }
    }

    // ==================== Execution ====================

    /// Start a consultation and run it to completion.
    ///
    /// Fails with [`ConsultError::Validation`] before anything happens when the
    /// case lacks a name or problem or no agents are configured. Failures of
    /// single turns or votes are recorded in the history and never abort the
    /// session; only cancellation does.
    pub async fn start(&mut self) -> Result<ConsultationOutcome, ConsultError> {
        self.begin()?;
        self.run().await
    }

    fn begin(&mut self) -> Result<(), ConsultError> {
        self.case.validate()?;
        if self.agents.is_empty() {
            return Err(DomainError::NoAgents.into());
        }
        self.workflow.ensure_can_begin()?;

        for agent in &mut self.agents {
            agent.reset();
        }
        let queue = self.turn_queue();
        self.workflow.begin_session(queue)?;
        self.pause.resume();
        self.summary = FinalSummary::default();
        self.last_success = None;
        self.round_votes.clear();

        info!(
            "Starting consultation for {} with {} agents",
            self.case.name,
            self.agents.len()
        );
        self.announce_round();
        Ok(())
    }

    async fn run(&mut self) -> Result<ConsultationOutcome, ConsultError> {
        loop {
            self.run_discussion_round().await?;
            self.run_voting().await?;
            self.confirm_vote();

            let cap = self.settings.max_rounds_without_elimination;
            if let Some(reason) = check_end_conditions(&self.workflow, cap, &self.agents) {
                return self.finish(reason).await;
            }
            self.next_round()?;
        }
    }

    fn turn_queue(&self) -> Vec<String> {
        generate_turn_queue(&self.agents, self.settings.turn_order, &mut rand::thread_rng())
    }

    fn announce_round(&mut self) {
        let round = self.workflow.current_round();
        self.record(Entry::system(format!("Round {} of the consultation started", round)));
        self.logger.log(ConversationEvent::new(
            "round_started",
            json!({ "round": round, "queue": self.workflow.turn_queue() }),
        ));
        self.observer.on_phase_change(Phase::Discussion);
        self.observer.on_round_start(round, self.workflow.turn_queue());
    }

    fn next_round(&mut self) -> Result<(), ConsultError> {
        for agent in &mut self.agents {
            agent.votes = 0;
        }
        let queue = self.turn_queue();
        self.workflow.next_round(queue)?;
        self.announce_round();
        Ok(())
    }

    async fn fetch_knowledge(&self) -> Vec<RetrievedEntry> {
        fetch_context(
            self.knowledge.as_ref(),
            case_query_text(&self.case, &self.history),
            &self.selected_knowledge,
            self.params.knowledge_top_k,
        )
        .await
    }

    // ==================== Discussion ====================

    async fn run_discussion_round(&mut self) -> Result<(), ConsultError> {
        let round = self.workflow.current_round();
        let knowledge = self.fetch_knowledge().await;
        let queue = self.workflow.turn_queue().to_vec();
        let total = queue.len();

        for (idx, agent_id) in queue.iter().enumerate() {
            let Some(agent) = self
                .agents
                .iter()
                .find(|a| &a.id == agent_id && a.is_active())
                .cloned()
            else {
                continue;
            };

            self.wait_while_paused().await?;
            self.workflow.start_turn(&agent.id, &agent.name, idx);
            let placeholder = self.history.begin_turn(&agent.name);
            self.notify_entry(placeholder);
            self.observer.on_turn_start(&agent, idx, total);

            let ctx = PromptContext {
                case: &self.case,
                linked: &self.linked_cases,
                knowledge: &knowledge,
            };
            let prompt =
                PromptTemplate::discussion(agent.system_prompt(&self.settings.system_prompt), ctx, &agent);
            let history = provider_history(&self.history, &agent.id);

            let result = call_with_timeout(
                self.gateway.generate(&agent, &prompt, &history),
                self.params.call_timeout,
                &self.cancel,
            )
            .await;

            match result {
                Ok(text) => {
                    let entry = self.history.commit_turn(&agent.id, &agent.name, text.clone());
                    self.notify_entry(entry);
                    self.reveal(&agent, &text).await?;
                    self.last_success = Some(agent.id.clone());
                    debug!("{} responded ({} chars)", agent.name, text.chars().count());
                    self.logger.log(ConversationEvent::new(
                        "turn_completed",
                        json!({
                            "round": round,
                            "agent_id": agent.id,
                            "agent_name": agent.name,
                            "content": text,
                        }),
                    ));
                    self.observer.on_turn_complete(&agent, true);
                }
                Err(GatewayError::Cancelled) => {
                    self.history.cancel_turn();
                    self.workflow.end_turn(idx);
                    return Err(ConsultError::Cancelled);
                }
                Err(e) => {
                    warn!("Call to {} failed: {}", agent.name, e);
                    let entry = self.history.fail_turn(&agent.id, &agent.name, &e.to_string());
                    self.notify_entry(entry);
                    self.logger.log(ConversationEvent::new(
                        "turn_failed",
                        json!({
                            "round": round,
                            "agent_id": agent.id,
                            "agent_name": agent.name,
                            "error": e.to_string(),
                        }),
                    ));
                    self.observer.on_turn_complete(&agent, false);
                }
            }
            self.workflow.end_turn(idx);
        }

        self.workflow.enter_voting()?;
        self.observer.on_phase_change(Phase::Voting);
        self.record(Entry::system(
            "This round of discussion is over; the panel is evaluating the answers...",
        ));
        Ok(())
    }

    /// Hand a committed reply to observers piece by piece
    async fn reveal(&mut self, agent: &Agent, text: &str) -> Result<(), ConsultError> {
        let step = self.params.reveal_chunk_chars;
        if step == 0 {
            self.observer.on_reveal_chunk(agent, text);
            return Ok(());
        }

        let chars: Vec<char> = text.chars().collect();
        for piece in chars.chunks(step) {
            self.wait_while_paused().await?;
            let chunk: String = piece.iter().collect();
            self.observer.on_reveal_chunk(agent, &chunk);
            if !self.params.reveal_delay.is_zero() {
                tokio::time::sleep(self.params.reveal_delay).await;
            }
        }
        Ok(())
    }

    // ==================== Voting ====================

    async fn run_voting(&mut self) -> Result<(), ConsultError> {
        for agent in &mut self.agents {
            agent.votes = 0;
        }
        self.round_votes.clear();

        let round = self.workflow.current_round();
        let knowledge = self.fetch_knowledge().await;
        let panel: Vec<Agent> = self.active_agents().cloned().collect();
        info!("Round {}: collecting votes from {} agents", round, panel.len());

        for voter in &panel {
            self.wait_while_paused().await?;
            let vote = self.collect_vote(voter, &panel, &knowledge).await?;

            let record = VoteRecord {
                round,
                voter_id: voter.id.clone(),
                voter_name: voter.name.clone(),
                target_id: vote.target_id,
                target_name: vote.target_name,
                reason: vote.reason,
            };
            self.round_votes.push(record.clone());
            let entry = self.history.push_vote_detail(record.clone());
            self.notify_entry(entry);
            apply_votes(&mut self.agents, std::slice::from_ref(&record));

            debug!("{} voted for {}", record.voter_name, record.target_name);
            self.logger.log(ConversationEvent::new(
                "vote_cast",
                json!({
                    "round": round,
                    "voter_id": record.voter_id,
                    "target_id": record.target_id,
                    "reason": record.reason,
                    "resolution": format!("{:?}", vote.resolution),
                }),
            ));
            self.observer.on_vote(&record);

            if !self.params.vote_gap.is_zero() {
                tokio::time::sleep(self.params.vote_gap).await;
            }
        }

        if !self.params.tally_delay.is_zero() {
            tokio::time::sleep(self.params.tally_delay).await;
        }
        Ok(())
    }

    /// Obtain one voter's decision, falling back to a self-vote
    async fn collect_vote(
        &mut self,
        voter: &Agent,
        panel: &[Agent],
        knowledge: &[RetrievedEntry],
    ) -> Result<ResolvedVote, ConsultError> {
        if !voter.has_credentials() {
            return Ok(simulated_self_vote(voter));
        }

        let ctx = PromptContext {
            case: &self.case,
            linked: &self.linked_cases,
            knowledge,
        };
        let prompt = PromptTemplate::vote(voter.system_prompt(&self.settings.system_prompt), ctx, panel, voter);
        let history = provider_history(&self.history, &voter.id);

        let response = match call_with_timeout(
            self.gateway.generate(voter, &prompt, &history),
            self.params.call_timeout,
            &self.cancel,
        )
        .await
        {
            Ok(text) => text,
            Err(GatewayError::Cancelled) => return Err(ConsultError::Cancelled),
            Err(e) => {
                warn!("Vote from {} failed, falling back: {}", voter.name, e);
                String::new()
            }
        };

        let raw = response.trim();
        let decision = (!raw.is_empty()).then(|| parse_vote(raw, panel));
        if let Some(decision) = &decision
            && !decision.has_target()
        {
            self.record(Entry::system(format!(
                "Vote output was not valid JSON; raw content: {}",
                take_chars(raw, VOTE_DIAGNOSTIC_CHARS)
            )));
        }

        Ok(resolve_vote(decision.as_ref(), voter, panel).unwrap_or_else(|| simulated_self_vote(voter)))
    }

    fn confirm_vote(&mut self) -> TallyOutcome {
        let outcome = tally(&self.agents);
        match &outcome {
            TallyOutcome::Eliminated {
                agent_id,
                agent_name,
                votes,
            } => {
                if let Some(agent) = self.agents.iter_mut().find(|a| &a.id == agent_id) {
                    agent.eliminate();
                }
                self.workflow.record_elimination();
                info!("{} eliminated with {} votes", agent_name, votes);
            }
            TallyOutcome::NoElimination { max_votes } => {
                self.workflow.record_no_elimination();
                info!(
                    "No elimination (max votes {}), {} round(s) without elimination",
                    max_votes,
                    self.workflow.rounds_without_elimination()
                );
            }
        }

        self.record(Entry::VoteResult {
            content: outcome.message(),
        });
        self.logger.log(ConversationEvent::new(
            "tally",
            json!({
                "round": self.workflow.current_round(),
                "eliminated": match &outcome {
                    TallyOutcome::Eliminated { agent_id, .. } => Some(agent_id.clone()),
                    TallyOutcome::NoElimination { .. } => None,
                },
                "rounds_without_elimination": self.workflow.rounds_without_elimination(),
            }),
        ));
        self.observer.on_tally(&outcome);
        outcome
    }

    // ==================== Termination ====================

    async fn finish(&mut self, reason: FinishReason) -> Result<ConsultationOutcome, ConsultError> {
        self.workflow.finish()?;
        self.observer.on_phase_change(Phase::Finished);
        self.record(Entry::system(reason.message()));
        info!("Consultation finished after {} rounds: {:?}", self.workflow.current_round(), reason);
        self.logger.log(ConversationEvent::new(
            "consultation_finished",
            json!({
                "rounds": self.workflow.current_round(),
                "reason": reason,
            }),
        ));
        self.observer.on_finished(&reason);

        let summary = self.generate_final_summary(reason.preferred_agent()).await;
        Ok(ConsultationOutcome {
            rounds: self.workflow.current_round(),
            reason,
            summary,
        })
    }

    /// Request the closing synthesis, preferring `preferred` as its author.
    ///
    /// Can be called again after a consultation finished to regenerate it.
    pub async fn generate_final_summary(&mut self, preferred: Option<&str>) -> FinalSummary {
        let producer = FinalSummaryProducer::new(
            &self.gateway,
            self.knowledge.as_ref(),
            &self.params,
            self.observer.as_ref(),
            self.logger.as_ref(),
        );
        let request = SummaryRequest {
            agents: &self.agents,
            preferred,
            last_success: self.last_success.as_deref(),
            summary_prompt: self.settings.effective_summary_prompt(),
            case: &self.case,
            linked: &self.linked_cases,
            history: &self.history,
            selected_knowledge: &self.selected_knowledge,
        };
        let summary = producer.produce(request, &self.cancel).await;
        self.summary = summary.clone();
        summary
    }

    // ==================== Helpers ====================

    /// Block while paused; fails once cancellation is requested
    async fn wait_while_paused(&mut self) -> Result<(), ConsultError> {
        if self.cancel.is_cancelled() {
            return Err(ConsultError::Cancelled);
        }
        let mut rx = self.pause.subscribe();
        if !*rx.borrow_and_update() {
            return Ok(());
        }

        info!("Consultation paused");
        self.workflow.set_paused(true);
        self.observer.on_pause_changed(true);
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() || !*rx.borrow_and_update() {
                        break;
                    }
                }
                _ = self.cancel.cancelled() => return Err(ConsultError::Cancelled),
            }
        }
        self.workflow.set_paused(false);
        self.observer.on_pause_changed(false);
        info!("Consultation resumed");
        Ok(())
    }

    fn record(&mut self, entry: Entry) {
        let idx = self.history.push(entry);
        self.notify_entry(idx);
    }

    fn notify_entry(&self, idx: usize) {
        if let Some(entry) = self.history.get(idx) {
            self.observer.on_entry(entry);
        }
    }
}
