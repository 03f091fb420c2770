//! Shared utilities for use cases.
//!
//! Timeout-bounded provider calls and best-effort knowledge retrieval used by
//! both the consultation engine and the final summary producer.

use crate::ports::agent_gateway::GatewayError;
use crate::ports::knowledge_source::{KnowledgeSource, RetrievalQuery};
use consilium_domain::RetrievedEntry;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Await a provider call for at most `timeout`.
///
/// On expiry the in-flight future is dropped and [`GatewayError::Timeout`]
/// is returned. Cancelling `token` aborts the wait with
/// [`GatewayError::Cancelled`].
pub(crate) async fn call_with_timeout<F>(
    call: F,
    timeout: Duration,
    token: &CancellationToken,
) -> Result<String, GatewayError>
where
    F: Future<Output = Result<String, GatewayError>>,
{
    tokio::select! {
        result = tokio::time::timeout(timeout, call) => {
            result.unwrap_or(Err(GatewayError::Timeout))
        }
        _ = token.cancelled() => Err(GatewayError::Cancelled),
    }
}

/// Retrieve context, turning any failure into an empty result
pub(crate) async fn fetch_context(
    source: &dyn KnowledgeSource,
    text: String,
    selected: &[String],
    top_k: u32,
) -> Vec<RetrievedEntry> {
    let query = RetrievalQuery::new(text)
        .with_selected(selected.to_vec())
        .with_top_k(top_k as f64);
    match source.retrieve_context(query).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Knowledge retrieval failed, continuing without context: {}", e);
            Vec::new()
        }
    }
}
