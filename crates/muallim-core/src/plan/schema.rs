//! Structured-output schema sent with every generation request.
//!
//! Uses the OpenAPI subset understood by the Gemini API (upper-case type
//! names). The shape must match [`super::types::LessonPlan`] exactly.

use serde_json::{Value, json};

use super::types::ActivityType;

/// MIME type requested for the model's response.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Build the lesson-plan response schema.
pub fn lesson_plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "level": { "type": "STRING", "description": "The grade level, e.g., Niveau 4" },
            "period": { "type": "STRING", "description": "The period number, e.g., Période 3" },
            "week": { "type": "STRING", "description": "The week number, e.g., Semaine 2" },
            "session": { "type": "STRING", "description": "The session number, e.g., Séance 3" },
            "sections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "INTEGER" },
                        "title": {
                            "type": "STRING",
                            "description": "Main title of activity, e.g., Acte de parole"
                        },
                        "subtitle": {
                            "type": "STRING",
                            "description": "Specific topic, e.g., Point de langue"
                        },
                        "duration": {
                            "type": "STRING",
                            "description": "Duration in minutes, e.g., 20 min"
                        },
                        "content": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "List of bullet points for the activity content"
                        },
                        "type": {
                            "type": "STRING",
                            "enum": ActivityType::SCHEMA_VALUES,
                            "description": "The type of activity determines the color/icon"
                        }
                    },
                    "required": ["id", "title", "duration", "content", "type"]
                }
            }
        },
        "required": ["level", "period", "week", "session", "sections"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_requires_all_plan_fields() {
        let schema = lesson_plan_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(
            schema["required"],
            json!(["level", "period", "week", "session", "sections"])
        );
    }

    #[test]
    fn section_subtitle_is_optional() {
        let schema = lesson_plan_schema();
        let item = &schema["properties"]["sections"]["items"];
        let required: Vec<&str> = item["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(!required.contains(&"subtitle"));
        assert!(item["properties"].get("subtitle").is_some());
        assert_eq!(required, ["id", "title", "duration", "content", "type"]);
    }

    #[test]
    fn activity_type_is_a_closed_enum() {
        let schema = lesson_plan_schema();
        let ty = &schema["properties"]["sections"]["items"]["properties"]["type"];
        assert_eq!(ty["enum"], json!(["speaking", "writing", "reading"]));
        assert_eq!(
            schema["properties"]["sections"]["items"]["properties"]["id"]["type"],
            "INTEGER"
        );
    }
}
