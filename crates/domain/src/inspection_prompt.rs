use crate::ComplianceAttribute;

/// Version tag of the questionnaire and the output shape the parser expects.
pub const INSPECTION_PROMPT_VERSION: &str = "ppe-v1";

const PREAMBLE: &str = "あなたは、作業者の装備状態を評価する「安全装備チェックAI」です。\
次の手順に従い、入力された画像内の人物（もしくは主要な人物）について、\
以下の4項目が満たされているかどうかを判定してください。\n\n";

const VALUE_GUIDE: &str = "\n- \"YES\" は、その項目が「該当する」または「確認できる」という意味です。\n\
- \"NO\" は、その項目が「該当しない」または「確認できない」という意味です。\n\
- \"UNCERTAIN\" は、画像が不鮮明などの理由で「判定が難しい」場合に使用してください。\n\n\
人物が複数写っている場合は、主要な人物について評価してください。\n";

/// Fixed questionnaire sent to the vision model with every image.
///
/// The output-format block is rendered from [`ComplianceAttribute`] so the
/// labels requested here are exactly the labels the verdict parser reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionPrompt {
    version: &'static str,
    text: String,
}

impl InspectionPrompt {
    /// Returns the current prompt revision.
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: INSPECTION_PROMPT_VERSION,
            text: render_prompt(),
        }
    }

    /// Returns the prompt version tag.
    #[must_use]
    pub fn version(&self) -> &str {
        self.version
    }

    /// Returns the full prompt text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }
}

impl Default for InspectionPrompt {
    fn default() -> Self {
        Self::current()
    }
}

fn render_prompt() -> String {
    let mut text = String::from(PREAMBLE);

    for (index, attribute) in ComplianceAttribute::all().iter().enumerate() {
        text.push_str(&format!("{}. {}\n", index + 1, attribute.question()));
    }

    text.push_str("\n【出力フォーマット】\n");
    for attribute in ComplianceAttribute::all() {
        text.push_str(&format!(
            "{}: [YES / NO / UNCERTAIN]\n",
            attribute.response_label()
        ));
    }

    text.push_str(VALUE_GUIDE);
    text
}

#[cfg(test)]
mod tests {
    use super::{INSPECTION_PROMPT_VERSION, InspectionPrompt};
    use crate::ComplianceAttribute;

    #[test]
    fn prompt_requests_every_parser_label() {
        let prompt = InspectionPrompt::current();

        for attribute in ComplianceAttribute::all() {
            let format_line = format!("{}: [YES / NO / UNCERTAIN]", attribute.response_label());
            assert!(prompt.text().contains(&format_line));
            assert!(prompt.text().contains(attribute.question()));
        }
    }

    #[test]
    fn prompt_numbers_questions_in_order() {
        let prompt = InspectionPrompt::current();
        let first = prompt.text().find("1. ヘルメット");
        let last = prompt.text().find("4. 安全ベスト");

        assert!(matches!((first, last), (Some(first), Some(last)) if first < last));
        assert_eq!(prompt.version(), INSPECTION_PROMPT_VERSION);
    }
}
