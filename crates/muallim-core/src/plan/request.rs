//! Request construction: instructions, schema and content parts.
//!
//! Turns a [`LessonContext`] and optional inline files into a single
//! [`GenerationRequest`]. This module is pure logic (no I/O); the transport
//! in [`crate::client`] maps the request onto the wire.

use serde::Serialize;
use serde_json::Value;

use super::schema::{RESPONSE_MIME_TYPE, lesson_plan_schema};
use super::types::LessonContext;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Model used when no override is configured. Supports image and PDF input.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// One generation call: model, contents and output configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub model: String,
    pub contents: Contents,
    pub config: GenerationConfig,
}

/// Either a plain instruction string or a multimodal part list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Contents {
    Text(String),
    Parts { parts: Vec<Part> },
}

impl Contents {
    /// Number of inline binary parts carried by this payload.
    pub fn inline_count(&self) -> usize {
        match self {
            Self::Text(_) => 0,
            Self::Parts { parts } => parts
                .iter()
                .filter(|p| matches!(p, Part::InlineData(_)))
                .count(),
        }
    }
}

/// A single content part.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    InlineData(InlineData),
    Text(String),
}

/// Base64 payload plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Standard base64, without any `data:` URL prefix.
    pub data: String,
}

/// Structured-output configuration attached to every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
    pub system_instruction: String,
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// Role given to the model on every call.
pub const SYSTEM_INSTRUCTION: &str = "Tu es un expert pédagogique pour le ministère de l'éducation nationale du Maroc. \
Tu crées des contenus adaptés aux élèves du primaire.";

/// Task rules shared by the text-only and multimodal prompts.
const BASE_INSTRUCTIONS: &str = "Je veux exactement 3 activités principales (Sections) qui correspondent au style visuel d'une leçon type :
1. Une activité orale (\"Acte de parole\" ou \"Communication\").
2. Une activité de langue ou d'écriture (\"Lecture\" ou \"Point de langue\").
3. Une activité de production ou lecture (\"Lecture\" ou \"Production\").

Sois concis. Utilise des phrases courtes pour le contenu.
La réponse DOIT être en JSON valide selon le schéma fourni.";

/// Prompt used when no files are attached.
fn text_prompt(ctx: &LessonContext) -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str("Génère une fiche pédagogique structurée pour un cours de français au Maroc.\n");
    prompt.push_str(&format!(
        "Contexte: {}, {}, {}.\n",
        ctx.level, ctx.period, ctx.week
    ));
    prompt.push_str(&format!("Sujet global ou thème: \"{}\".\n\n", ctx.subject));
    prompt.push_str(BASE_INSTRUCTIONS);
    prompt
}

/// Text part that follows the inline files in a multimodal request.
fn document_prompt(ctx: &LessonContext, file_count: usize) -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str(&format!(
        "Analyse ces documents ({file_count} fichiers : images ou PDF) qui peuvent être des \
         diapositives, des pages de manuel ou des plans de cours.\n"
    ));
    prompt.push_str(
        "Synthétise les informations (sujet, objectifs, activités) pour générer une fiche \
         pédagogique structurée pour un cours de français au Maroc.\n\n",
    );
    prompt.push_str("Contexte imposé (adapte le contenu des documents à ce niveau):\n");
    prompt.push_str(&format!(
        "Niveau: {}, Période: {}, Semaine: {}.\n",
        ctx.level, ctx.period, ctx.week
    ));
    if let Some(subject) = ctx.subject_hint() {
        prompt.push_str(&format!("Thème/Sujet suggéré: \"{subject}\"\n"));
    }
    prompt.push('\n');
    prompt.push_str(BASE_INSTRUCTIONS);
    prompt
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the generation request for a lesson context.
///
/// With files, the contents are every file as an inline part (input order)
/// followed by one text part. Without files, the contents are a single
/// instruction string. The schema and system instruction are always set.
pub fn build_request(model: &str, ctx: &LessonContext, files: &[InlineData]) -> GenerationRequest {
    let contents = if files.is_empty() {
        Contents::Text(text_prompt(ctx))
    } else {
        let mut parts: Vec<Part> = files.iter().cloned().map(Part::InlineData).collect();
        parts.push(Part::Text(document_prompt(ctx, files.len())));
        Contents::Parts { parts }
    };

    GenerationRequest {
        model: model.to_string(),
        contents,
        config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            response_schema: lesson_plan_schema(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> LessonContext {
        LessonContext::new("Niveau 4", "Période 3", "Semaine 2", "La forêt")
    }

    fn pdf() -> InlineData {
        InlineData {
            mime_type: "application/pdf".to_string(),
            data: "JVBERi0=".to_string(),
        }
    }

    #[test]
    fn text_only_request_embeds_context() {
        let req = build_request(DEFAULT_MODEL, &forest(), &[]);
        let Contents::Text(text) = &req.contents else {
            panic!("expected text contents, got {:?}", req.contents);
        };
        for needle in ["Niveau 4", "Période 3", "Semaine 2", "\"La forêt\""] {
            assert!(text.contains(needle), "prompt missing {needle:?}: {text}");
        }
        assert!(text.contains("exactement 3 activités"));
        assert_eq!(req.contents.inline_count(), 0);
    }

    #[test]
    fn multimodal_request_puts_files_before_text() {
        let png = InlineData {
            mime_type: "image/png".to_string(),
            data: "iVBORw0=".to_string(),
        };
        let req = build_request(DEFAULT_MODEL, &forest(), &[png.clone(), pdf()]);
        let Contents::Parts { parts } = &req.contents else {
            panic!("expected parts");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], Part::InlineData(png));
        assert_eq!(parts[1], Part::InlineData(pdf()));
        let Part::Text(text) = &parts[2] else {
            panic!("last part should be text");
        };
        assert!(text.contains("(2 fichiers"));
        assert!(text.contains("Niveau: Niveau 4, Période: Période 3, Semaine: Semaine 2."));
        assert!(text.contains("Thème/Sujet suggéré: \"La forêt\""));
    }

    #[test]
    fn multimodal_request_omits_blank_subject() {
        let ctx = LessonContext::new("Niveau 2", "Période 1", "Semaine 5", "  ");
        let req = build_request(DEFAULT_MODEL, &ctx, &[pdf()]);
        let Contents::Parts { parts } = &req.contents else {
            panic!("expected parts");
        };
        let Part::Text(text) = parts.last().unwrap() else {
            panic!("last part should be text");
        };
        assert!(!text.contains("Thème/Sujet suggéré"));
    }

    #[test]
    fn config_always_carries_schema_and_instruction() {
        let req = build_request("custom-model", &forest(), &[]);
        assert_eq!(req.model, "custom-model");
        assert_eq!(req.config.response_mime_type, "application/json");
        assert_eq!(req.config.response_schema, lesson_plan_schema());
        assert!(req.config.system_instruction.contains("expert pédagogique"));
    }

    #[test]
    fn serializes_to_logical_wire_shape() {
        let req = build_request(DEFAULT_MODEL, &forest(), &[pdf()]);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["config"]["responseMimeType"], "application/json");
        assert!(value["config"]["responseSchema"].is_object());
        assert!(value["config"]["systemInstruction"].is_string());
        let parts = value["contents"]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[0]["inlineData"]["data"], "JVBERi0=");
        assert!(parts[1]["text"].is_string());

        let text_only = serde_json::to_value(build_request(DEFAULT_MODEL, &forest(), &[])).unwrap();
        assert!(text_only["contents"].is_string());
    }

    #[test]
    fn building_is_deterministic() {
        let a = build_request(DEFAULT_MODEL, &forest(), &[pdf()]);
        let b = build_request(DEFAULT_MODEL, &forest(), &[pdf()]);
        assert_eq!(a, b);
    }
}
