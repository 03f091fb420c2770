//! HTTP adapter implementing [`AgentGateway`] for every supported provider.
//!
//! Routing is per agent: the agent's [`Provider`] selects the wire format,
//! endpoint and authentication scheme. Agents without an API key never touch
//! the network and get a canned reply instead.

use super::endpoints::{
    ANTHROPIC_VERSION, chat_url, default_root, is_google_host, modelscope_chat_roots,
    modelscope_list_roots, normalize_base_url,
};
use super::error::ProviderError;
use super::wire::{
    AnthropicRequest, AnthropicResponse, ChatRequest, ChatResponse, GeminiRequest, GeminiResponse,
    ModelListResponse, ProviderReply,
};
use async_trait::async_trait;
use consilium_application::{AgentGateway, GatewayError};
use consilium_domain::core::string::truncate;
use consilium_domain::{Agent, PromptBundle, Provider, ProviderMessage};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay before a simulated reply
pub const SIMULATED_DELAY: Duration = Duration::from_millis(600);

/// Upper bound for a single HTTP exchange
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Error bodies longer than this are cut before being reported
pub(crate) const MAX_ERROR_BODY: usize = 500;

/// Canned reply for agents running without credentials
pub fn simulated_reply(agent_name: &str) -> String {
    format!(
        "[Simulated reply - {}]\nBased on the record and discussion, further physical and auxiliary examinations are needed to clarify the diagnosis.",
        agent_name
    )
}

/// A model offered by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub display_name: Option<String>,
}

impl ModelInfo {
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) => format!("{} ({})", self.id, name),
            None => self.id.clone(),
        }
    }
}

pub struct HttpAgentGateway {
    client: Client,
    simulated_delay: Duration,
}

impl HttpAgentGateway {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;
        Ok(Self {
            client,
            simulated_delay: SIMULATED_DELAY,
        })
    }

    pub fn with_simulated_delay(mut self, delay: Duration) -> Self {
        self.simulated_delay = delay;
        self
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    fn bearer(&self, url: &str, api_key: &str) -> RequestBuilder {
        self.client.post(url).bearer_auth(api_key)
    }

    async fn call(
        &self,
        agent: &Agent,
        prompt: &PromptBundle,
        history: &[ProviderMessage],
    ) -> Result<ProviderReply, ProviderError> {
        let config = &agent.provider;
        let api_key = config.api_key.trim();
        let model = config.model.as_str();
        let root = normalize_base_url(config.base_url.as_deref(), default_root(config.provider));

        match config.provider {
            Provider::OpenAi | Provider::SiliconFlow => {
                let url = format!("{}/v1/chat/completions", root);
                let body = ChatRequest::new(model, prompt, history);
                let response: ChatResponse = Self::send(self.bearer(&url, api_key).json(&body)).await?;
                Ok(ProviderReply::Chat(response))
            }
            Provider::Anthropic => {
                let url = format!("{}/v1/messages", root);
                let body = AnthropicRequest::new(model, prompt, history);
                let request = self
                    .client
                    .post(&url)
                    .header("x-api-key", api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&body);
                let response: AnthropicResponse = Self::send(request).await?;
                Ok(ProviderReply::Anthropic(response))
            }
            Provider::Gemini => {
                let url = format!("{}/v1beta/models/{}:generateContent", root, model);
                let body = GeminiRequest::new(prompt, history);
                let mut request = self.client.post(&url).json(&body);
                request = if is_google_host(&root) {
                    request.query(&[("key", api_key)])
                } else {
                    request.header("x-goog-api-key", api_key)
                };
                let response: GeminiResponse = Self::send(request).await?;
                Ok(ProviderReply::Gemini(response))
            }
            Provider::ModelScope => {
                let body = ChatRequest::new(model, prompt, history);
                let mut failures = Vec::new();
                for root in modelscope_chat_roots(api_key, config.base_url.as_deref()) {
                    let url = chat_url(&root);
                    match Self::send::<ChatResponse>(self.bearer(&url, api_key).json(&body)).await {
                        Ok(response) => return Ok(ProviderReply::Chat(response)),
                        Err(e) => {
                            debug!("ModelScope endpoint {} failed: {}", root, e);
                            failures.push(e.at(&root));
                        }
                    }
                }
                Err(ProviderError::AllEndpointsFailed(failures))
            }
        }
    }

    /// List the models a provider offers, sorted by id
    pub async fn list_models(
        &self,
        provider: Provider,
        api_key: &str,
        base_url: Option<&str>,
    ) -> Result<Vec<ModelInfo>, ProviderError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ProviderError::Missing("api key"));
        }
        let root = normalize_base_url(base_url, default_root(provider));

        let entries = match provider {
            Provider::OpenAi | Provider::SiliconFlow => {
                let request = self.client.get(format!("{}/v1/models", root)).bearer_auth(api_key);
                Self::send::<ModelListResponse>(request).await?.into_entries()
            }
            Provider::Anthropic => {
                let request = self
                    .client
                    .get(format!("{}/v1/models", root))
                    .header("x-api-key", api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION);
                Self::send::<ModelListResponse>(request).await?.into_entries()
            }
            Provider::Gemini => {
                let mut failures = Vec::new();
                let mut found = None;
                for version in ["v1", "v1beta"] {
                    let mut request = self.client.get(format!("{}/{}/models", root, version));
                    request = if is_google_host(&root) {
                        request.query(&[("key", api_key)])
                    } else {
                        request.header("x-goog-api-key", api_key)
                    };
                    match Self::send::<ModelListResponse>(request).await {
                        Ok(list) => {
                            found = Some(list.into_entries());
                            break;
                        }
                        Err(e) => failures.push(e.at(&format!("{}/{}", root, version))),
                    }
                }
                found.ok_or(ProviderError::AllEndpointsFailed(failures))?
            }
            Provider::ModelScope => {
                let mut failures = Vec::new();
                let mut found = None;
                for root in modelscope_list_roots(api_key, base_url) {
                    let request = self.client.get(format!("{}/models", root)).bearer_auth(api_key);
                    match Self::send::<ModelListResponse>(request).await {
                        Ok(list) => {
                            found = Some(list.into_entries());
                            break;
                        }
                        Err(e) => failures.push(e.at(&root)),
                    }
                }
                found.ok_or(ProviderError::AllEndpointsFailed(failures))?
            }
        };

        let mut models: Vec<ModelInfo> = entries
            .into_iter()
            .filter_map(|m| {
                let id = m.id.or(m.slug).or(m.name)?;
                let id = id.strip_prefix("models/").map(str::to_string).unwrap_or(id);
                if id.is_empty() {
                    return None;
                }
                Some(ModelInfo {
                    id,
                    display_name: m.display_name.or(m.owned_by).or(m.provider),
                })
            })
            .collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(models)
    }
}

#[async_trait]
impl AgentGateway for HttpAgentGateway {
    async fn generate(
        &self,
        agent: &Agent,
        prompt: &PromptBundle,
        history: &[ProviderMessage],
    ) -> Result<String, GatewayError> {
        if !agent.has_credentials() {
            debug!("{} has no API key, replying in simulated mode", agent.name);
            if !self.simulated_delay.is_zero() {
                tokio::time::sleep(self.simulated_delay).await;
            }
            return Ok(simulated_reply(&agent.name));
        }

        debug!(
            "Calling {} ({}) for {}",
            agent.provider.provider, agent.provider.model, agent.name
        );
        match self.call(agent, prompt, history).await {
            Ok(reply) => Ok(reply.into_text()),
            Err(e) => {
                warn!("{} call for {} failed: {}", agent.provider.provider, agent.name, e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consilium_domain::ProviderConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt() -> PromptBundle {
        PromptBundle {
            system: "You are a diagnostician.".into(),
            user: "Give your opinion.".into(),
        }
    }

    fn agent_for(provider: Provider, base_url: &str, key: &str) -> Agent {
        Agent::new(
            "doc-1",
            "Dr Zhang",
            ProviderConfig::new(provider, "test-model")
                .with_api_key(key)
                .with_base_url(base_url),
        )
    }

    fn gateway() -> HttpAgentGateway {
        HttpAgentGateway::new().unwrap().with_simulated_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_simulated_reply_without_key() {
        let agent = Agent::new("doc-1", "Dr Zhang", ProviderConfig::new(Provider::OpenAi, "gpt-4o"));
        let text = gateway().generate(&agent, &prompt(), &[]).await.unwrap();
        assert!(text.starts_with("[Simulated reply - Dr Zhang]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_reply_waits() {
        let gateway = HttpAgentGateway::new().unwrap();
        let agent = Agent::new("doc-1", "Dr Zhang", ProviderConfig::new(Provider::OpenAi, "gpt-4o"));
        let started = tokio::time::Instant::now();
        gateway.generate(&agent, &prompt(), &[]).await.unwrap();
        assert!(started.elapsed() >= SIMULATED_DELAY);
    }

    #[tokio::test]
    async fn test_openai_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "test-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": " Community-acquired pneumonia. "}}]
            })))
            .mount(&server)
            .await;

        let agent = agent_for(Provider::OpenAi, &server.uri(), "sk-test");
        let history = vec![ProviderMessage::user("Dr Wang: fever for 3 days")];
        let text = gateway().generate(&agent, &prompt(), &history).await.unwrap();
        assert_eq!(text, "Community-acquired pneumonia.");
    }

    #[tokio::test]
    async fn test_anthropic_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({"max_tokens": 1024})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"content": [{"type": "text", "text": "ACS"}]})),
            )
            .mount(&server)
            .await;

        let agent = agent_for(Provider::Anthropic, &server.uri(), "sk-ant");
        assert_eq!(gateway().generate(&agent, &prompt(), &[]).await.unwrap(), "ACS");
    }

    #[tokio::test]
    async fn test_gemini_non_google_host_uses_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Migraine"}]}}]
            })))
            .mount(&server)
            .await;

        let agent = agent_for(Provider::Gemini, &server.uri(), "g-key");
        assert_eq!(gateway().generate(&agent, &prompt(), &[]).await.unwrap(), "Migraine");
    }

    #[tokio::test]
    async fn test_provider_error_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let agent = agent_for(Provider::SiliconFlow, &server.uri(), "sk-bad");
        let err = gateway().generate(&agent, &prompt(), &[]).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Provider {
                status: 401,
                body: "invalid key".into()
            }
        );
    }

    #[tokio::test]
    async fn test_modelscope_explicit_base_url_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(1)
            .mount(&server)
            .await;

        let agent = agent_for(Provider::ModelScope, &format!("{}/v1", server.uri()), "ms-key");
        let err = gateway().generate(&agent, &prompt(), &[]).await.unwrap_err();
        match err {
            GatewayError::Provider { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, format!("endpoint {}/v1: 503 busy", server.uri()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_models_sorted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "gpt-4o", "owned_by": "openai"},
                    {"id": "gpt-3.5-turbo"},
                    {"owned_by": "nobody"}
                ]
            })))
            .mount(&server)
            .await;

        let models = gateway()
            .list_models(Provider::OpenAi, "sk-test", Some(&server.uri()))
            .await
            .unwrap();
        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["gpt-3.5-turbo", "gpt-4o"]);
        assert_eq!(models[1].label(), "gpt-4o (openai)");
    }

    #[tokio::test]
    async fn test_list_gemini_falls_back_to_v1beta() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "models/gemini-1.5-pro", "displayName": "Gemini 1.5 Pro"}]
            })))
            .mount(&server)
            .await;

        let models = gateway()
            .list_models(Provider::Gemini, "g-key", Some(&server.uri()))
            .await
            .unwrap();
        assert_eq!(models[0].id, "gemini-1.5-pro");
        assert_eq!(models[0].display_name.as_deref(), Some("Gemini 1.5 Pro"));
    }

    #[tokio::test]
    async fn test_list_models_requires_key() {
        let err = gateway().list_models(Provider::OpenAi, " ", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::Missing(_)));
    }
}
