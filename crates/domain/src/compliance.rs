use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ppecheck_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::ObjectLocation;

/// Judgment of the vision model on one compliance attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// The attribute is satisfied.
    Yes,
    /// The attribute is not satisfied.
    No,
    /// The model could not decide, or its answer was unusable.
    #[default]
    Uncertain,
}

impl Verdict {
    /// Returns the stable storage value for this verdict.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
            Self::Uncertain => "UNCERTAIN",
        }
    }

    /// Returns whether the verdict counts as compliant.
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl FromStr for Verdict {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            "UNCERTAIN" => Ok(Self::Uncertain),
            other => Err(AppError::Validation(format!(
                "unknown verdict value '{other}'"
            ))),
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Safety-compliance attribute judged for the depicted worker.
///
/// The declaration order is the order used by prompts, notifications, and
/// storage columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceAttribute {
    /// Helmet worn correctly.
    Helmet,
    /// Hair short or tied back.
    Hair,
    /// Work clothes worn.
    WorkClothes,
    /// Reflective safety vest worn.
    SafetyVest,
}

impl ComplianceAttribute {
    /// Returns all attributes in declaration order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ComplianceAttribute] = &[
            ComplianceAttribute::Helmet,
            ComplianceAttribute::Hair,
            ComplianceAttribute::WorkClothes,
            ComplianceAttribute::SafetyVest,
        ];

        ALL
    }

    /// Returns the line label the model is asked to emit.
    #[must_use]
    pub fn response_label(&self) -> &'static str {
        match self {
            Self::Helmet => "Helmet",
            Self::Hair => "Hair",
            Self::WorkClothes => "WorkClothes",
            Self::SafetyVest => "SafetyVest",
        }
    }

    /// Returns the analytic table column storing this attribute.
    #[must_use]
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Helmet => "helmet",
            Self::Hair => "hair",
            Self::WorkClothes => "work_clothes",
            Self::SafetyVest => "safety_vest",
        }
    }

    /// Returns the human-readable name used in alerts.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Helmet => "ヘルメット",
            Self::Hair => "髪の毛",
            Self::WorkClothes => "作業着",
            Self::SafetyVest => "安全ベスト",
        }
    }

    /// Returns the questionnaire item put to the model.
    #[must_use]
    pub fn question(&self) -> &'static str {
        match self {
            Self::Helmet => "ヘルメットを正しくかぶっているか",
            Self::Hair => "髪の毛は短い、あるいは適切にまとめられているか",
            Self::WorkClothes => "作業着を着用しているか",
            Self::SafetyVest => "安全ベスト（反射ベスト）を着用しているか",
        }
    }
}

/// The four verdicts produced for one image. Every field is always set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComplianceVerdicts {
    /// Helmet verdict.
    #[serde(rename = "Helmet")]
    pub helmet: Verdict,
    /// Hair verdict.
    #[serde(rename = "Hair")]
    pub hair: Verdict,
    /// Work clothes verdict.
    #[serde(rename = "WorkClothes")]
    pub work_clothes: Verdict,
    /// Safety vest verdict.
    #[serde(rename = "SafetyVest")]
    pub safety_vest: Verdict,
}

impl ComplianceVerdicts {
    /// Returns a verdict set with every attribute uncertain.
    #[must_use]
    pub fn all_uncertain() -> Self {
        Self::default()
    }

    /// Returns the verdict recorded for one attribute.
    #[must_use]
    pub fn verdict(&self, attribute: ComplianceAttribute) -> Verdict {
        match attribute {
            ComplianceAttribute::Helmet => self.helmet,
            ComplianceAttribute::Hair => self.hair,
            ComplianceAttribute::WorkClothes => self.work_clothes,
            ComplianceAttribute::SafetyVest => self.safety_vest,
        }
    }

    /// Returns a copy with one attribute replaced.
    #[must_use]
    pub fn with_verdict(mut self, attribute: ComplianceAttribute, verdict: Verdict) -> Self {
        match attribute {
            ComplianceAttribute::Helmet => self.helmet = verdict,
            ComplianceAttribute::Hair => self.hair = verdict,
            ComplianceAttribute::WorkClothes => self.work_clothes = verdict,
            ComplianceAttribute::SafetyVest => self.safety_vest = verdict,
        }

        self
    }

    /// Iterates attribute/verdict pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ComplianceAttribute, Verdict)> + '_ {
        ComplianceAttribute::all()
            .iter()
            .map(|attribute| (*attribute, self.verdict(*attribute)))
    }

    /// Returns whether every attribute is compliant.
    #[must_use]
    pub fn is_fully_compliant(&self) -> bool {
        self.iter().all(|(_, verdict)| verdict.is_compliant())
    }
}

/// Structured outcome of one inspection, tagged with its source object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    file_name: NonEmptyString,
    verdicts: ComplianceVerdicts,
}

impl ComplianceRecord {
    /// Creates a validated compliance record.
    pub fn new(file_name: impl Into<String>, verdicts: ComplianceVerdicts) -> AppResult<Self> {
        Ok(Self {
            file_name: NonEmptyString::new(file_name)?,
            verdicts,
        })
    }

    /// Creates a record for the object that triggered the inspection.
    #[must_use]
    pub fn for_object(location: &ObjectLocation, verdicts: ComplianceVerdicts) -> Self {
        Self {
            file_name: location.file_name().clone(),
            verdicts,
        }
    }

    /// Returns the source object name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Returns the four verdicts.
    #[must_use]
    pub fn verdicts(&self) -> &ComplianceVerdicts {
        &self.verdicts
    }
}
