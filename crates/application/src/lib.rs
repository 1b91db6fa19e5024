//! Application services and ports.

#![forbid(unsafe_code)]

mod inspection_error;
mod inspection_ports;
mod inspection_service;
mod invocation_scratch;

pub use inspection_error::StageError;
pub use inspection_ports::{
    ComplianceNotifier, ComplianceRecordSink, FetchedObject, GenerationSettings,
    NotificationDelivery, ObjectFetcher, VisionAnalyzer, VisionRequest,
};
pub use inspection_service::{
    InspectionFailure, InspectionOutcome, InspectionReport, InspectionRequest, InspectionService,
    InspectionSettings, InspectionStage, resolve_image_mime_type,
};
pub use invocation_scratch::InvocationScratch;
