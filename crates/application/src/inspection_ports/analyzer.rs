use async_trait::async_trait;
use ppecheck_core::{AppError, AppResult};
use ppecheck_domain::InspectionPrompt;

/// Sampling configuration for one model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    max_output_tokens: u32,
    temperature: f32,
}

impl GenerationSettings {
    /// Default upper bound on generated tokens.
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;
    /// Default sampling temperature.
    pub const DEFAULT_TEMPERATURE: f32 = 0.4;

    /// Creates validated generation settings.
    pub fn new(max_output_tokens: u32, temperature: f32) -> AppResult<Self> {
        if max_output_tokens == 0 {
            return Err(AppError::Validation(
                "max_output_tokens must be greater than zero".to_owned(),
            ));
        }

        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::Validation(format!(
                "temperature must be between 0.0 and 2.0, got {temperature}"
            )));
        }

        Ok(Self {
            max_output_tokens,
            temperature,
        })
    }

    /// Returns the output token limit.
    #[must_use]
    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    /// Returns the sampling temperature.
    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_output_tokens: Self::DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }
}

/// One image submitted for compliance analysis.
#[derive(Debug, Clone, Copy)]
pub struct VisionRequest<'a> {
    /// Raw image bytes.
    pub image_bytes: &'a [u8],
    /// Image media type, e.g. `image/jpeg`.
    pub mime_type: &'a str,
    /// Questionnaire sent with the image.
    pub prompt: &'a InspectionPrompt,
    /// Sampling configuration.
    pub generation: GenerationSettings,
}

/// Port for generative vision model calls.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Returns the raw text the model produced for the request.
    async fn analyze(&self, request: VisionRequest<'_>) -> AppResult<String>;
}
