//! The text generation service used for the spending analysis.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The chat completions endpoint used when no other URL is configured.
pub const DEFAULT_ANALYSIS_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used when no other model is configured.
pub const DEFAULT_ANALYSIS_MODEL: &str = "gpt-3.5-turbo";

const TEMPERATURE: f64 = 0.7;
const USER_AGENT: &str = concat!("cachin/", env!("CARGO_PKG_VERSION"));

/// A service that generates text from a system instruction and a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Generate a response to `prompt`, following the instructions in `system`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::AnalysisFailed] if no text could be generated.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, Error>;
}

/// Where and how to reach the chat completions API.
#[derive(Clone)]
pub struct AnalysisConfig {
    /// The URL of the chat completions endpoint.
    pub url: String,
    /// The name of the model to use.
    pub model: String,
    /// The bearer token for the API. Requests fail without one.
    pub api_key: Option<String>,
    /// How long to wait for a response.
    pub timeout: Duration,
}

impl AnalysisConfig {
    /// A config for the default endpoint and model.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            url: DEFAULT_ANALYSIS_URL.to_owned(),
            model: DEFAULT_ANALYSIS_MODEL.to_owned(),
            api_key,
            timeout: Duration::from_secs(60),
        }
    }
}

impl Debug for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// A [TextGenerator] backed by an OpenAI compatible chat completions API.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    config: AnalysisConfig,
}

impl ChatCompletionsClient {
    /// Create a client for the API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::AnalysisFailed] if the HTTP client could not be built.
    pub fn new(config: AnalysisConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| Error::AnalysisFailed(error.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, Error> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::AnalysisFailed("no API key is configured".to_owned()))?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.config.url.as_str())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| Error::AnalysisFailed(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::AnalysisFailed(format!(
                "the language model API responded with {status}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|error| Error::AnalysisFailed(error.to_string()))?;

        tracing::debug!(
            "Received {} choices from the language model",
            body.choices.len()
        );

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                Error::AnalysisFailed("the language model returned no choices".to_owned())
            })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode, header::AUTHORIZATION},
        routing::post,
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use crate::{
        Error,
        analysis::generator::{AnalysisConfig, ChatCompletionsClient, TextGenerator},
    };

    async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let content = format!(
            "{}|{}|{}|{}:{}|{}:{}",
            authorization,
            body["model"].as_str().unwrap_or_default(),
            body["temperature"],
            body["messages"][0]["role"].as_str().unwrap_or_default(),
            body["messages"][0]["content"].as_str().unwrap_or_default(),
            body["messages"][1]["role"].as_str().unwrap_or_default(),
            body["messages"][1]["content"].as_str().unwrap_or_default(),
        );

        Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }))
    }

    async fn no_choices() -> Json<Value> {
        Json(json!({ "choices": [] }))
    }

    async fn server_error() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    async fn spawn_fake_api() -> SocketAddr {
        let app = Router::new()
            .route("/echo", post(echo))
            .route("/empty", post(no_choices))
            .route("/broken", post(server_error));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        address
    }

    fn client_for(
        address: SocketAddr,
        path: &str,
        api_key: Option<&str>,
    ) -> ChatCompletionsClient {
        let config = AnalysisConfig {
            url: format!("http://{address}{path}"),
            model: "test-model".to_owned(),
            ..AnalysisConfig::new(api_key.map(str::to_owned))
        };

        ChatCompletionsClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn returns_first_choice() {
        let address = spawn_fake_api().await;
        let client = client_for(address, "/echo", Some("secret"));

        let text = client.generate("be nice", "analyse this").await.unwrap();

        assert_eq!(
            text,
            "Bearer secret|test-model|0.7|system:be nice|user:analyse this"
        );
    }

    #[tokio::test]
    async fn fails_without_choices() {
        let address = spawn_fake_api().await;
        let client = client_for(address, "/empty", Some("secret"));

        let result = client.generate("be nice", "analyse this").await;

        assert!(matches!(result, Err(Error::AnalysisFailed(_))));
    }

    #[tokio::test]
    async fn fails_on_error_status() {
        let address = spawn_fake_api().await;
        let client = client_for(address, "/broken", Some("secret"));

        let result = client.generate("be nice", "analyse this").await;

        assert_eq!(
            result,
            Err(Error::AnalysisFailed(
                "the language model API responded with 500 Internal Server Error".to_owned()
            ))
        );
    }

    #[tokio::test]
    async fn fails_without_api_key() {
        let address = spawn_fake_api().await;
        let client = client_for(address, "/echo", None);

        let result = client.generate("be nice", "analyse this").await;

        assert_eq!(
            result,
            Err(Error::AnalysisFailed("no API key is configured".to_owned()))
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let config = AnalysisConfig::new(Some("secret".to_owned()));

        assert!(!format!("{config:?}").contains("secret"));
    }
}
