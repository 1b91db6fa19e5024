//! Domain entities and invariants for worker safety-equipment inspections.

#![forbid(unsafe_code)]

mod compliance;
mod inspection_prompt;
mod notification;
mod object_location;
mod verdict_parser;

pub use compliance::{ComplianceAttribute, ComplianceRecord, ComplianceVerdicts, Verdict};
pub use inspection_prompt::{INSPECTION_PROMPT_VERSION, InspectionPrompt};
pub use notification::{NgSummary, NotificationMessage};
pub use object_location::ObjectLocation;
pub use verdict_parser::{ParsedVerdicts, parse_compliance_verdicts};
