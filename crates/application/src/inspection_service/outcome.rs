use ppecheck_core::InvocationId;
use ppecheck_domain::ComplianceRecord;

use crate::StageError;

/// Pipeline stages of one invocation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InspectionStage {
    /// The storage event was accepted.
    Received,
    /// Object bytes are in scratch space.
    Fetched,
    /// The vision model returned text.
    Analyzed,
    /// A compliance record was derived from the text.
    Parsed,
    /// The record append was attempted.
    Persisted,
    /// The alert dispatch was attempted.
    Notified,
    /// The invocation completed.
    Done,
    /// A fatal stage failed.
    Errored,
}

impl InspectionStage {
    /// Returns a stable stage name for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Fetched => "fetched",
            Self::Analyzed => "analyzed",
            Self::Parsed => "parsed",
            Self::Persisted => "persisted",
            Self::Notified => "notified",
            Self::Done => "done",
            Self::Errored => "errored",
        }
    }
}

/// Successful invocation result.
#[derive(Debug)]
pub struct InspectionReport {
    /// Invocation identifier.
    pub invocation_id: InvocationId,
    /// Parsed compliance record.
    pub record: ComplianceRecord,
    /// Non-fatal stage failures absorbed during the invocation.
    pub diagnostics: Vec<StageError>,
    /// Stages passed through, ending with [`InspectionStage::Done`].
    pub stages: Vec<InspectionStage>,
    /// Version of the prompt the record was produced with.
    pub prompt_version: String,
}

/// Fatal invocation result.
#[derive(Debug)]
pub struct InspectionFailure {
    /// Invocation identifier.
    pub invocation_id: InvocationId,
    /// Last stage reached before the failure.
    pub failed_after: InspectionStage,
    /// The fatal error.
    pub error: StageError,
}

/// Outcome of one pipeline invocation.
#[derive(Debug)]
pub enum InspectionOutcome {
    /// A compliance record was produced.
    Completed(InspectionReport),
    /// A fatal stage failed; nothing was persisted or sent.
    Failed(InspectionFailure),
}

impl InspectionOutcome {
    /// Returns whether the invocation produced a record.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the record of a completed invocation.
    #[must_use]
    pub fn record(&self) -> Option<&ComplianceRecord> {
        match self {
            Self::Completed(report) => Some(&report.record),
            Self::Failed(_) => None,
        }
    }

    /// Returns the final stage of the invocation.
    #[must_use]
    pub fn final_stage(&self) -> InspectionStage {
        match self {
            Self::Completed(_) => InspectionStage::Done,
            Self::Failed(_) => InspectionStage::Errored,
        }
    }
}
