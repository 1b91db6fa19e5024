use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ppecheck_application::{VisionAnalyzer, VisionRequest};
use ppecheck_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::AccessTokenProvider;

const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Vertex AI endpoint coordinates for one Gemini model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAiConfig {
    base_url: Url,
    project_id: String,
    location: String,
    model: String,
}

impl VertexAiConfig {
    /// Creates a configuration for the regional Vertex AI endpoint.
    pub fn new(project_id: impl Into<String>, location: impl Into<String>) -> AppResult<Self> {
        let project_id = project_id.into();
        let location = location.into();

        if project_id.trim().is_empty() {
            return Err(AppError::Validation(
                "vertex project id must not be empty".to_owned(),
            ));
        }
        if location.trim().is_empty() {
            return Err(AppError::Validation(
                "vertex location must not be empty".to_owned(),
            ));
        }

        let base_url = Url::parse(&format!("https://{location}-aiplatform.googleapis.com"))
            .map_err(|error| {
                AppError::Validation(format!("invalid vertex location '{location}': {error}"))
            })?;

        Ok(Self {
            base_url,
            project_id,
            location,
            model: DEFAULT_MODEL.to_owned(),
        })
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Overrides the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        self.model.as_str()
    }

    fn generate_content_url(&self) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "vertex base url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "locations",
                self.location.as_str(),
                "publishers",
                "google",
                "models",
                format!("{}:generateContent", self.model).as_str(),
            ]);

        Ok(url)
    }
}

/// Gemini on Vertex AI implementation of the vision analyzer port.
pub struct VertexGeminiVisionAnalyzer {
    http_client: reqwest::Client,
    config: VertexAiConfig,
    token_provider: Arc<dyn AccessTokenProvider>,
}

impl VertexGeminiVisionAnalyzer {
    /// Creates an analyzer for the configured model.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        config: VertexAiConfig,
        token_provider: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http_client,
            config,
            token_provider,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: RequestGenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseCandidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> AppResult<String> {
        if let Some(reason) = self
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(AppError::Unavailable(format!(
                "vertex ai blocked the prompt: {reason}"
            )));
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(AppError::Unavailable(
                "vertex ai response contained no candidates".to_owned(),
            ));
        };

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::Unavailable(format!(
                "vertex ai candidate contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl VisionAnalyzer for VertexGeminiVisionAnalyzer {
    async fn analyze(&self, request: VisionRequest<'_>) -> AppResult<String> {
        let url = self.config.generate_content_url()?;
        let token = self.token_provider.access_token().await?;

        let payload = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![
                    RequestPart::Text {
                        text: request.prompt.text(),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: request.mime_type,
                            data: STANDARD.encode(request.image_bytes),
                        },
                    },
                ],
            }],
            generation_config: RequestGenerationConfig {
                max_output_tokens: request.generation.max_output_tokens(),
                temperature: request.generation.temperature(),
            },
        };

        debug!(
            model = self.config.model(),
            prompt_version = request.prompt.version(),
            image_bytes = request.image_bytes.len(),
            "calling vertex ai generateContent"
        );

        let response = self
            .http_client
            .post(url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to call vertex ai generateContent: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Unavailable(format!(
                "vertex ai generateContent returned status {}: {body}",
                status.as_u16()
            )));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to parse vertex ai generateContent response: {error}"
                ))
            })?
            .into_text()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockito::Matcher;
    use ppecheck_application::{GenerationSettings, VisionAnalyzer, VisionRequest};
    use ppecheck_core::AppError;
    use ppecheck_domain::InspectionPrompt;
    use serde_json::json;
    use url::Url;

    use super::{VertexAiConfig, VertexGeminiVisionAnalyzer};
    use crate::StaticAccessTokenProvider;

    const ENDPOINT: &str = "/v1/projects/sharelabai-hackathon/locations/us-central1/publishers/google/models/gemini-2.0-flash-exp:generateContent";

    fn analyzer(base_url: &str) -> VertexGeminiVisionAnalyzer {
        let Ok(base_url) = Url::parse(base_url) else {
            panic!("mock server url should parse");
        };
        let Ok(config) = VertexAiConfig::new("sharelabai-hackathon", "us-central1") else {
            panic!("vertex config should be valid");
        };

        VertexGeminiVisionAnalyzer::new(
            reqwest::Client::new(),
            config.with_base_url(base_url),
            Arc::new(StaticAccessTokenProvider::new("vertex-token")),
        )
    }

    #[test]
    fn default_base_url_is_regional() {
        let Ok(config) = VertexAiConfig::new("project", "asia-northeast1") else {
            panic!("vertex config should be valid");
        };
        let url = config.generate_content_url().map(|url| url.to_string());

        assert_eq!(
            url.ok().as_deref(),
            Some(
                "https://asia-northeast1-aiplatform.googleapis.com/v1/projects/project/locations/asia-northeast1/publishers/google/models/gemini-2.0-flash-exp:generateContent"
            )
        );
    }

    #[test]
    fn empty_project_is_rejected() {
        assert!(matches!(
            VertexAiConfig::new(" ", "us-central1"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn analyze_sends_prompt_image_and_generation_config() {
        let mut server = mockito::Server::new_async().await;
        let prompt = InspectionPrompt::current();
        let mock = server
            .mock("POST", ENDPOINT)
            .match_header("authorization", "Bearer vertex-token")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": prompt.text() },
                        { "inlineData": { "mimeType": "image/png", "data": "AQID" } }
                    ]
                }],
                "generationConfig": { "maxOutputTokens": 1024 }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [
                                { "text": "Helmet: YES\nHair: NO\n" },
                                { "text": "WorkClothes: YES\nSafetyVest: UNCERTAIN" }
                            ]
                        },
                        "finishReason": "STOP"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = analyzer(&server.url())
            .analyze(VisionRequest {
                image_bytes: &[1, 2, 3],
                mime_type: "image/png",
                prompt: &prompt,
                generation: GenerationSettings::default(),
            })
            .await;

        mock.assert_async().await;
        assert_eq!(
            result.ok().as_deref(),
            Some("Helmet: YES\nHair: NO\nWorkClothes: YES\nSafetyVest: UNCERTAIN")
        );
    }

    #[tokio::test]
    async fn blocked_prompt_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ENDPOINT)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;
        let prompt = InspectionPrompt::current();

        let result = analyzer(&server.url())
            .analyze(VisionRequest {
                image_bytes: &[0xff, 0xd8],
                mime_type: "image/jpeg",
                prompt: &prompt,
                generation: GenerationSettings::default(),
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::Unavailable(message)) if message.contains("SAFETY")
        ));
    }

    #[tokio::test]
    async fn error_status_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ENDPOINT)
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;
        let prompt = InspectionPrompt::current();

        let result = analyzer(&server.url())
            .analyze(VisionRequest {
                image_bytes: &[0xff, 0xd8],
                mime_type: "image/jpeg",
                prompt: &prompt,
                generation: GenerationSettings::default(),
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::Unavailable(message)) if message.contains("429")
        ));
    }
}
