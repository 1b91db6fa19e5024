use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use ppecheck_core::{AppError, InvocationId};
use ppecheck_domain::{
    ComplianceRecord, InspectionPrompt, NotificationMessage, ObjectLocation,
    parse_compliance_verdicts,
};
use tracing::{Instrument, info, info_span, warn};

use crate::inspection_ports::{
    ComplianceNotifier, ComplianceRecordSink, GenerationSettings, NotificationDelivery,
    ObjectFetcher, VisionAnalyzer, VisionRequest,
};
use crate::{InvocationScratch, StageError};

mod media_type;
mod outcome;

pub use media_type::resolve_image_mime_type;
pub use outcome::{InspectionFailure, InspectionOutcome, InspectionReport, InspectionStage};

/// Explicit per-deployment pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionSettings {
    /// Sampling configuration for the vision model.
    pub generation: GenerationSettings,
    /// Directory under which per-invocation scratch directories are created.
    pub scratch_root: PathBuf,
}

impl InspectionSettings {
    /// Creates settings with default generation parameters.
    #[must_use]
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            generation: GenerationSettings::default(),
            scratch_root: scratch_root.into(),
        }
    }

    /// Replaces the generation parameters.
    #[must_use]
    pub fn with_generation(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }
}

impl Default for InspectionSettings {
    fn default() -> Self {
        Self::new(env::temp_dir())
    }
}

/// One storage event to inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionRequest {
    /// Location of the uploaded image.
    pub location: ObjectLocation,
    /// Content type announced by the trigger, if any.
    pub content_type_hint: Option<String>,
}

impl InspectionRequest {
    /// Creates a request without a content type hint.
    #[must_use]
    pub fn new(location: ObjectLocation) -> Self {
        Self {
            location,
            content_type_hint: None,
        }
    }
}

/// Pipeline orchestrator: fetch, analyze, parse, persist, notify.
#[derive(Clone)]
pub struct InspectionService {
    fetcher: Arc<dyn ObjectFetcher>,
    analyzer: Arc<dyn VisionAnalyzer>,
    sink: Arc<dyn ComplianceRecordSink>,
    notifier: Arc<dyn ComplianceNotifier>,
    prompt: Arc<InspectionPrompt>,
    settings: InspectionSettings,
}

impl InspectionService {
    /// Creates an inspection service.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn ObjectFetcher>,
        analyzer: Arc<dyn VisionAnalyzer>,
        sink: Arc<dyn ComplianceRecordSink>,
        notifier: Arc<dyn ComplianceNotifier>,
        settings: InspectionSettings,
    ) -> Self {
        Self {
            fetcher,
            analyzer,
            sink,
            notifier,
            prompt: Arc::new(InspectionPrompt::current()),
            settings,
        }
    }

    /// Runs the pipeline for one storage event.
    ///
    /// Never returns an error: fatal stage failures become
    /// [`InspectionOutcome::Failed`], and persistence or notification
    /// failures are attached to the report as diagnostics.
    pub async fn inspect(&self, request: InspectionRequest) -> InspectionOutcome {
        let invocation_id = InvocationId::new();
        let span = info_span!(
            "inspection",
            invocation_id = %invocation_id,
            object = %request.location,
        );

        self.run(invocation_id, request).instrument(span).await
    }

    async fn run(
        &self,
        invocation_id: InvocationId,
        request: InspectionRequest,
    ) -> InspectionOutcome {
        let mut stages = vec![InspectionStage::Received];
        info!(prompt_version = self.prompt.version(), "inspection received");

        let raw_text = match self
            .fetch_and_analyze(invocation_id, &request, &mut stages)
            .await
        {
            Ok(raw_text) => raw_text,
            Err(error) => {
                let failed_after = stages.last().copied().unwrap_or(InspectionStage::Received);
                warn!(
                    stage = failed_after.as_str(),
                    kind = error.kind(),
                    error = %error,
                    "inspection failed"
                );

                return InspectionOutcome::Failed(InspectionFailure {
                    invocation_id,
                    failed_after,
                    error,
                });
            }
        };

        let parsed = parse_compliance_verdicts(&raw_text);
        if parsed.is_unrecognized() {
            warn!("model output contained no verdict lines, all attributes set to UNCERTAIN");
        } else if !parsed.missing().is_empty() {
            warn!(missing = ?parsed.missing(), "model output is missing verdict lines");
        }

        let record = ComplianceRecord::for_object(&request.location, parsed.verdicts());
        stages.push(InspectionStage::Parsed);
        info!(
            helmet = %record.verdicts().helmet,
            hair = %record.verdicts().hair,
            work_clothes = %record.verdicts().work_clothes,
            safety_vest = %record.verdicts().safety_vest,
            "compliance verdicts parsed"
        );

        let mut diagnostics = Vec::new();

        match self.sink.append(&record).await {
            Ok(()) => info!("compliance record persisted"),
            Err(error) => {
                let error = StageError::Persistence(error);
                warn!(error = %error, "compliance record was not persisted");
                diagnostics.push(error);
            }
        }
        stages.push(InspectionStage::Persisted);

        let message = NotificationMessage::for_record(&record);
        match self.notifier.notify(&message).await {
            Ok(NotificationDelivery::Delivered) => {
                info!(passed = message.is_passed(), "compliance notification sent");
            }
            Ok(NotificationDelivery::Skipped { reason }) => {
                info!(reason = %reason, "compliance notification skipped");
            }
            Err(error) => {
                let error = StageError::Notification(error);
                warn!(error = %error, "compliance notification was not sent");
                diagnostics.push(error);
            }
        }
        stages.push(InspectionStage::Notified);
        stages.push(InspectionStage::Done);

        info!(diagnostics = diagnostics.len(), "inspection completed");

        InspectionOutcome::Completed(InspectionReport {
            invocation_id,
            record,
            diagnostics,
            stages,
            prompt_version: self.prompt.version().to_owned(),
        })
    }

    async fn fetch_and_analyze(
        &self,
        invocation_id: InvocationId,
        request: &InspectionRequest,
        stages: &mut Vec<InspectionStage>,
    ) -> Result<String, StageError> {
        let scratch = InvocationScratch::acquire(&self.settings.scratch_root, invocation_id)
            .await
            .map_err(StageError::Fetch)?;
        let destination = scratch.path_for(&request.location);

        let fetched = self
            .fetcher
            .fetch(&request.location, &destination)
            .await
            .map_err(StageError::Fetch)?;
        let image_bytes = tokio::fs::read(&fetched.path).await.map_err(|error| {
            StageError::Fetch(AppError::Internal(format!(
                "failed to read fetched object '{}': {error}",
                fetched.path.display()
            )))
        })?;
        stages.push(InspectionStage::Fetched);

        let mime_type = resolve_image_mime_type(
            fetched.content_type.as_deref(),
            request.content_type_hint.as_deref(),
            &request.location,
        );
        info!(
            size_bytes = fetched.size_bytes,
            mime_type = %mime_type,
            "uploaded object fetched"
        );

        let raw_text = self
            .analyzer
            .analyze(VisionRequest {
                image_bytes: &image_bytes,
                mime_type: &mime_type,
                prompt: &self.prompt,
                generation: self.settings.generation,
            })
            .await
            .map_err(StageError::Analysis)?;
        stages.push(InspectionStage::Analyzed);
        info!(response_chars = raw_text.chars().count(), "vision analysis returned");

        if let Err(error) = scratch.release().await {
            warn!(error = %error, "failed to release invocation scratch space");
        }

        Ok(raw_text)
    }
}
