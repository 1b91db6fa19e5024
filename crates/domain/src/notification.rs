use crate::{ComplianceAttribute, ComplianceRecord, ComplianceVerdicts};

const PASSED_SUBJECT: &str = "[OK] 作業者装備自動点検通知";
const PASSED_BODY: &str = "素晴らしいです！\n本日も作業を安全に行ってください！";
const FAILED_SUBJECT: &str = "[NG] 作業者装備自動点検通知";
const FAILED_INTRO: &str = "以下の項目について確認が必要です：\n\n";
const FAILED_OUTRO: &str = "\n安全第一で作業をお願いします！";

/// Attributes whose verdict is not YES, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgSummary {
    attributes: Vec<ComplianceAttribute>,
}

impl NgSummary {
    /// Derives the summary from a verdict set.
    #[must_use]
    pub fn from_verdicts(verdicts: &ComplianceVerdicts) -> Self {
        Self {
            attributes: verdicts
                .iter()
                .filter(|(_, verdict)| !verdict.is_compliant())
                .map(|(attribute, _)| attribute)
                .collect(),
        }
    }

    /// Returns the failing attributes.
    #[must_use]
    pub fn attributes(&self) -> &[ComplianceAttribute] {
        &self.attributes
    }

    /// Returns the human-readable names of the failing attributes.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.attributes
            .iter()
            .map(ComplianceAttribute::display_name)
            .collect()
    }

    /// Returns true when every attribute passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Alert composed for one compliance record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    subject: String,
    body: String,
    passed: bool,
}

impl NotificationMessage {
    /// Composes the success or failure message for a summary.
    #[must_use]
    pub fn for_summary(summary: &NgSummary) -> Self {
        if summary.is_empty() {
            return Self {
                subject: PASSED_SUBJECT.to_owned(),
                body: PASSED_BODY.to_owned(),
                passed: true,
            };
        }

        let mut body = String::from(FAILED_INTRO);
        for (index, label) in summary.labels().iter().enumerate() {
            body.push_str(&format!("{}. {label}\n", index + 1));
        }
        body.push_str(FAILED_OUTRO);

        Self {
            subject: FAILED_SUBJECT.to_owned(),
            body,
            passed: false,
        }
    }

    /// Composes the message for a compliance record.
    #[must_use]
    pub fn for_record(record: &ComplianceRecord) -> Self {
        Self::for_summary(&NgSummary::from_verdicts(record.verdicts()))
    }

    /// Returns the alert subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the alert body.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Returns whether the message reports full compliance.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.passed
    }

    /// Renders subject and body as one chat-formatted text payload.
    #[must_use]
    pub fn to_text(&self) -> String {
        format!("*{}*\n{}", self.subject, self.body)
    }
}
