//! Final summary use case
//!
//! Asks panel members, in priority order, for the closing synthesis of a
//! consultation until one of them succeeds.

use crate::config::ExecutionParams;
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::knowledge_source::KnowledgeSource;
use crate::ports::progress::DiscussionObserver;
use crate::use_cases::shared::{call_with_timeout, fetch_context};
use consilium_domain::prompt::context::{case_query_text, provider_history};
use consilium_domain::summary::entities::summary_candidates;
use consilium_domain::{Agent, Case, DiscussionHistory, FinalSummary, LinkedCase, PromptContext, PromptTemplate};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Everything the producer reads from a finished consultation
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub agents: &'a [Agent],
    /// Agent asked first, typically the sole survivor
    pub preferred: Option<&'a str>,
    pub last_success: Option<&'a str>,
    pub summary_prompt: &'a str,
    pub case: &'a Case,
    pub linked: &'a [LinkedCase],
    pub history: &'a DiscussionHistory,
    pub selected_knowledge: &'a [String],
}

/// Use case for producing the final summary
pub struct FinalSummaryProducer<'a, G: AgentGateway + 'static> {
    gateway: &'a Arc<G>,
    knowledge: &'a dyn KnowledgeSource,
    params: &'a ExecutionParams,
    observer: &'a dyn DiscussionObserver,
    logger: &'a dyn ConversationLogger,
}

impl<'a, G: AgentGateway + 'static> FinalSummaryProducer<'a, G> {
    pub fn new(
        gateway: &'a Arc<G>,
        knowledge: &'a dyn KnowledgeSource,
        params: &'a ExecutionParams,
        observer: &'a dyn DiscussionObserver,
        logger: &'a dyn ConversationLogger,
    ) -> Self {
        Self {
            gateway,
            knowledge,
            params,
            observer,
            logger,
        }
    }

    /// Try each candidate in turn.
    ///
    /// Returns the first ready summary, or the last failure when every
    /// candidate failed. An idle summary means there was nobody to ask.
    pub async fn produce(&self, request: SummaryRequest<'_>, token: &CancellationToken) -> FinalSummary {
        let candidates = summary_candidates(request.agents, request.preferred, request.last_success);
        let mut summary = FinalSummary::default();

        for summarizer in candidates {
            summary = FinalSummary::pending(summarizer, request.summary_prompt);
            self.observer.on_summary(&summary);

            let knowledge = fetch_context(
                self.knowledge,
                case_query_text(request.case, request.history),
                request.selected_knowledge,
                self.params.knowledge_top_k,
            )
            .await;
            let ctx = PromptContext {
                case: request.case,
                linked: request.linked,
                knowledge: &knowledge,
            };
            let prompt = PromptTemplate::summary(request.summary_prompt, ctx, summarizer);
            let history = provider_history(request.history, &summarizer.id);

            let result = call_with_timeout(
                self.gateway.generate(summarizer, &prompt, &history),
                self.params.call_timeout,
                token,
            )
            .await;

            match result {
                Ok(content) => {
                    info!("Final summary written by {}", summarizer.name);
                    summary = FinalSummary::ready(summarizer, content, request.summary_prompt);
                    self.logger.log(ConversationEvent::new(
                        "summary_ready",
                        json!({
                            "agent_id": summarizer.id,
                            "agent_name": summarizer.name,
                            "bytes": summary.content.len(),
                        }),
                    ));
                    self.observer.on_summary(&summary);
                    return summary;
                }
                Err(e) => {
                    warn!("Summary by {} failed: {}", summarizer.name, e);
                    summary = FinalSummary::failed(summarizer, &e.to_string(), request.summary_prompt);
                    self.logger.log(ConversationEvent::new(
                        "summary_failed",
                        json!({
                            "agent_id": summarizer.id,
                            "agent_name": summarizer.name,
                            "error": e.to_string(),
                        }),
                    ));
                    self.observer.on_summary(&summary);
                    if token.is_cancelled() {
                        break;
                    }
                }
            }
        }
        summary
    }
}
