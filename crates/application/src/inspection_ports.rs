mod analyzer;
mod fetcher;
mod notifier;
mod sink;

pub use analyzer::{GenerationSettings, VisionAnalyzer, VisionRequest};
pub use fetcher::{FetchedObject, ObjectFetcher};
pub use notifier::{ComplianceNotifier, NotificationDelivery};
pub use sink::ComplianceRecordSink;
