use crate::{ComplianceAttribute, ComplianceVerdicts, Verdict};

/// Verdicts extracted from free-form model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVerdicts {
    verdicts: ComplianceVerdicts,
    recognized: Vec<ComplianceAttribute>,
}

impl ParsedVerdicts {
    fn unrecognized() -> Self {
        Self {
            verdicts: ComplianceVerdicts::all_uncertain(),
            recognized: Vec::new(),
        }
    }

    /// Returns the extracted verdicts, with unresolved attributes uncertain.
    #[must_use]
    pub fn verdicts(&self) -> ComplianceVerdicts {
        self.verdicts
    }

    /// Returns attributes that had a labelled line in the output.
    #[must_use]
    pub fn recognized(&self) -> &[ComplianceAttribute] {
        &self.recognized
    }

    /// Returns attributes without any labelled line, in declaration order.
    #[must_use]
    pub fn missing(&self) -> Vec<ComplianceAttribute> {
        ComplianceAttribute::all()
            .iter()
            .copied()
            .filter(|attribute| !self.recognized.contains(attribute))
            .collect()
    }

    /// Returns true when no labelled line was found at all.
    #[must_use]
    pub fn is_unrecognized(&self) -> bool {
        self.recognized.is_empty()
    }
}

/// Extracts the four compliance verdicts from raw model output.
///
/// Never fails. Lines are scanned in any order; a label is matched
/// case-insensitively and may be followed by whitespace before the colon.
/// Values must be exactly `YES`, `NO` or `UNCERTAIN`; anything else, lower
/// case included, resolves to uncertain, as do attributes without a line.
/// When a label repeats, the last line wins.
#[must_use]
pub fn parse_compliance_verdicts(raw_text: &str) -> ParsedVerdicts {
    let mut parsed = ParsedVerdicts::unrecognized();

    for (attribute, verdict) in raw_text.lines().filter_map(parse_verdict_line) {
        parsed.verdicts = parsed.verdicts.with_verdict(attribute, verdict);
        if !parsed.recognized.contains(&attribute) {
            parsed.recognized.push(attribute);
        }
    }

    if parsed.is_unrecognized() {
        return ParsedVerdicts::unrecognized();
    }

    parsed
}

fn parse_verdict_line(line: &str) -> Option<(ComplianceAttribute, Verdict)> {
    let line = line.trim();

    ComplianceAttribute::all().iter().find_map(|attribute| {
        let value = strip_label(line, attribute.response_label())?;
        let verdict = value.parse::<Verdict>().unwrap_or(Verdict::Uncertain);
        Some((*attribute, verdict))
    })
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }

    line.get(label.len()..)?.trim_start().strip_prefix(':')
}
