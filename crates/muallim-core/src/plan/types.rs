//! Lesson-plan data model.
//!
//! These types map directly to the JSON document the generative model is
//! asked to produce (see [`super::schema`]) and are (de)serialized via
//! `serde`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A generated lesson plan. Immutable once decoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LessonPlan {
    /// Grade label, e.g. "Niveau 4".
    pub level: String,
    /// Period label, e.g. "Période 3".
    pub period: String,
    /// Week label, e.g. "Semaine 2".
    pub week: String,
    /// Session label, e.g. "Séance 3". Expected to contain a numeral.
    pub session: String,
    /// Activity blocks, in rendering order.
    pub sections: Vec<LessonSection>,
}

/// One activity block of a [`LessonPlan`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LessonSection {
    /// Rendering key. Uniqueness within a plan is assumed, not enforced.
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Free-form label such as "20 min". Never parsed.
    pub duration: String,
    /// Bullet lines, in order.
    pub content: Vec<String>,
    #[serde(rename = "type")]
    pub activity: ActivityType,
}

/// Kind of activity; selects the visual theme of a section.
///
/// The remote schema restricts values to the three named variants, but
/// decoding never fails on anything else: unknown strings are kept in
/// [`ActivityType::Other`] and rendered with the default theme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    Speaking,
    Writing,
    Reading,
    Other(String),
}

impl ActivityType {
    /// The three values the response schema allows, in schema order.
    pub const SCHEMA_VALUES: [&'static str; 3] = ["speaking", "writing", "reading"];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Speaking => "speaking",
            Self::Writing => "writing",
            Self::Reading => "reading",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for ActivityType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "speaking" => Self::Speaking,
            "writing" => Self::Writing,
            "reading" => Self::Reading,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for ActivityType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ActivityType> for String {
    fn from(activity: ActivityType) -> Self {
        match activity {
            ActivityType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contextual labels sent to the model for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonContext {
    pub level: String,
    pub period: String,
    pub week: String,
    /// Free-text subject. May be blank when files are attached.
    pub subject: String,
}

impl LessonContext {
    pub fn new(
        level: impl Into<String>,
        period: impl Into<String>,
        week: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            level: level.into(),
            period: period.into(),
            week: week.into(),
            subject: subject.into(),
        }
    }

    /// The subject with surrounding whitespace removed, or `None` if blank.
    pub fn subject_hint(&self) -> Option<&str> {
        let trimmed = self.subject.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN_JSON: &str = r#"{
        "level": "Niveau 4",
        "period": "Période 3",
        "week": "Semaine 2",
        "session": "Séance 3",
        "sections": [
            {
                "id": 1,
                "title": "Acte de parole",
                "subtitle": "Se présenter",
                "duration": "20 min",
                "content": ["Écouter le dialogue", "Répondre aux questions"],
                "type": "speaking"
            },
            {
                "id": 2,
                "title": "Point de langue",
                "duration": "15 min",
                "content": ["Le pluriel des noms"],
                "type": "writing"
            }
        ]
    }"#;

    #[test]
    fn deserialize_plan_preserves_order_and_optionals() {
        let plan: LessonPlan = serde_json::from_str(PLAN_JSON).expect("should parse");
        assert_eq!(plan.level, "Niveau 4");
        assert_eq!(plan.session, "Séance 3");
        assert_eq!(plan.sections.len(), 2);
        assert_eq!(plan.sections[0].subtitle.as_deref(), Some("Se présenter"));
        assert_eq!(plan.sections[1].subtitle, None);
        assert_eq!(plan.sections[0].activity, ActivityType::Speaking);
        assert_eq!(plan.sections[1].activity, ActivityType::Writing);
        assert_eq!(
            plan.sections[0].content,
            vec!["Écouter le dialogue", "Répondre aux questions"]
        );
    }

    #[test]
    fn unknown_activity_type_is_kept_verbatim() {
        let json = r#"{"id":7,"title":"t","duration":"5 min","content":[],"type":"unknown-value"}"#;
        let section: LessonSection = serde_json::from_str(json).expect("should parse");
        assert_eq!(
            section.activity,
            ActivityType::Other("unknown-value".to_string())
        );

        let back = serde_json::to_value(&section).unwrap();
        assert_eq!(back["type"], "unknown-value");
        assert!(back.get("subtitle").is_none());
    }

    #[test]
    fn missing_required_field_fails() {
        let json = r#"{"id":1,"title":"t","content":[],"type":"reading"}"#;
        let err = serde_json::from_str::<LessonSection>(json).unwrap_err();
        assert!(err.to_string().contains("duration"), "unexpected error: {err}");
    }

    #[test]
    fn subject_hint_ignores_whitespace() {
        let ctx = LessonContext::new("Niveau 1", "Période 1", "Semaine 1", "   ");
        assert_eq!(ctx.subject_hint(), None);

        let ctx = LessonContext::new("Niveau 1", "Période 1", "Semaine 1", " La forêt ");
        assert_eq!(ctx.subject_hint(), Some("La forêt"));
    }
}
