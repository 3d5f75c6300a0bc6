//! Instruction templates and the trigger word they are rendered with.
//!
//! A template is plain text with `{trigger_word}` placeholders. Two built-in
//! templates cover the two kinds of training sets: garments (the trigger word
//! names the garment's identity) and people (the trigger word stands in for
//! the person).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder replaced by the trigger word when a template is rendered.
pub const TRIGGER_PLACEHOLDER: &str = "{trigger_word}";

const GARMENT_TEMPLATE: &str = "\
Generate a descriptive caption for the image provided.
Describe the garment identified by '{trigger_word}' with broad terms such as \"sweater,\" \"shirt,\" or \"jacket\" and simple colors.
Avoid specific details about the garment's style or intricate features, as these are part of the garment's identity associated with '{trigger_word}'.
If the garment is worn by a person, describe the person's pose, sex, race, body orientation, and any other clothing items or accessories separately from '{trigger_word}'.
Additionally, include details about the background, lighting, and any other contextual elements that are not part of the garment's identity.

For example, if the garment '{trigger_word}' is an orange sweater worn by a person standing outdoors, you might write:
'A person wearing an orange {trigger_word} sweater, standing with hands in pockets, in an outdoor setting with trees and sunlight in the background.'";

const PERSON_TEMPLATE: &str = "\
Generate a descriptive caption for the image provided.
Focus on describing the person's pose, situation, clothing details (such as color, style, and fit), and any visible background elements.
Use '{trigger_word}' as the identifier for the person without delving into the person's specific identity.
For example, if '{trigger_word}' is a male with a beard and curly hair standing with arms at sides, dressed in a dark suit and white shirt, describe it as:
'{trigger_word}, a male with a beard and curly hair standing with arms at sides, dressed in a dark suit and white shirt.'
Separate all contextual and background details from the individual description associated with '{trigger_word}'.";

/// Which built-in template a batch uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Describe the garment abstractly; everything else is context.
    #[default]
    Garment,
    /// Describe pose, clothing and background; the trigger word is the person.
    Person,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Garment => write!(f, "garment"),
            TemplateKind::Person => write!(f, "person"),
        }
    }
}

/// Instruction text sent alongside each image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// One of the built-in templates.
    pub fn builtin(kind: TemplateKind) -> Self {
        let text = match kind {
            TemplateKind::Garment => GARMENT_TEMPLATE,
            TemplateKind::Person => PERSON_TEMPLATE,
        };
        Self {
            text: text.to_string(),
        }
    }

    /// A user-supplied template. It must reference the trigger word.
    pub fn custom(text: &str) -> Result<Self, ConfigError> {
        let text = text.trim();
        if !text.contains(TRIGGER_PLACEHOLDER) {
            return Err(ConfigError::ValidationError(format!(
                "prompt template must contain {TRIGGER_PLACEHOLDER}"
            )));
        }
        Ok(Self {
            text: text.to_string(),
        })
    }

    /// Raw template text, placeholders included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute every placeholder with the trigger word, verbatim.
    pub fn render(&self, trigger_word: &str) -> String {
        self.text.replace(TRIGGER_PLACEHOLDER, trigger_word)
    }
}

/// Identity token that every caption in a batch must use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerWord(String);

impl TriggerWord {
    /// Wrap a trigger word exactly as given.
    ///
    /// Returns `None` for an empty or all-whitespace word.
    pub fn new(word: &str) -> Option<Self> {
        if word.trim().is_empty() {
            None
        } else {
            Some(Self(word.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TriggerWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garment_template_mentions_trigger_word() {
        let prompt = PromptTemplate::builtin(TemplateKind::Garment).render("SW_A");
        assert!(prompt.contains("'SW_A'"));
        assert!(prompt.contains("orange SW_A sweater"));
        assert!(!prompt.contains(TRIGGER_PLACEHOLDER));
    }

    #[test]
    fn test_person_template_mentions_trigger_word() {
        let prompt = PromptTemplate::builtin(TemplateKind::Person).render("model_A");
        assert!(prompt.contains("Use 'model_A' as the identifier"));
        assert!(!prompt.contains(TRIGGER_PLACEHOLDER));
    }

    #[test]
    fn test_templates_differ() {
        assert_ne!(
            PromptTemplate::builtin(TemplateKind::Garment),
            PromptTemplate::builtin(TemplateKind::Person)
        );
    }

    #[test]
    fn test_render_keeps_trigger_word_unmodified() {
        let template = PromptTemplate::custom("Subject: {trigger_word}.").unwrap();
        assert_eq!(template.render("Ünï $1 \\n"), "Subject: Ünï $1 \\n.");
    }

    #[test]
    fn test_custom_template_requires_placeholder() {
        assert!(PromptTemplate::custom("Describe the image.").is_err());
        assert!(PromptTemplate::custom("  Describe {trigger_word}.  ").is_ok());
    }

    #[test]
    fn test_template_kind_serde_lowercase() {
        let json = serde_json::to_string(&TemplateKind::Person).unwrap();
        assert_eq!(json, "\"person\"");
        let kind: TemplateKind = serde_json::from_str("\"garment\"").unwrap();
        assert_eq!(kind, TemplateKind::Garment);
    }

    #[test]
    fn test_trigger_word_kept_verbatim() {
        assert_eq!(TriggerWord::new("SW_A").unwrap().as_str(), "SW_A");
        assert_eq!(TriggerWord::new(" sks man ").unwrap().as_str(), " sks man ");

        let word = TriggerWord::new(" sks man ").unwrap();
        let prompt = PromptTemplate::builtin(TemplateKind::Garment).render(word.as_str());
        assert!(prompt.contains("' sks man '"));
    }

    #[test]
    fn test_trigger_word_rejects_blank() {
        assert!(TriggerWord::new("   ").is_none());
        assert!(TriggerWord::new("").is_none());
    }
}
