//! Plan service: one generation call, decoded into a [`LessonPlan`].

use crate::client::{ClientError, GenerativeClient};

use super::request::{InlineData, build_request};
use super::types::{LessonContext, LessonPlan};

/// Errors from [`generate_lesson_plan`].
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// No API key configured. Raised before any network I/O.
    #[error("API key is missing")]
    MissingCredential,

    /// Network, quota, authorization or schema rejection from the remote side.
    #[error(transparent)]
    Transport(#[from] ClientError),

    /// The call succeeded but carried no text.
    #[error("no response text from the generative model")]
    EmptyResponse,

    /// The text was not a lesson plan.
    #[error("response is not a valid lesson plan: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PlanError {
    /// Short machine-readable tag for the error origin.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::Transport(_) => "transport",
            Self::EmptyResponse => "empty_response",
            Self::Decode(_) => "decode",
        }
    }
}

/// Generate a lesson plan for `ctx`, optionally grounded on inline files.
///
/// Performs exactly one call on `client`, with no retry and no caching.
/// Fails with [`PlanError::MissingCredential`] without touching the client
/// when `credential` is absent or blank.
pub async fn generate_lesson_plan(
    client: &dyn GenerativeClient,
    credential: Option<&str>,
    model: &str,
    ctx: &LessonContext,
    files: &[InlineData],
) -> Result<LessonPlan, PlanError> {
    let credential = credential
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(PlanError::MissingCredential)?;

    let request = build_request(model, ctx, files);

    tracing::info!(
        model = %model,
        level = %ctx.level,
        period = %ctx.period,
        week = %ctx.week,
        inline_files = request.contents.inline_count(),
        "requesting lesson plan"
    );

    let text = client.generate(credential, &request).await.map_err(|e| {
        tracing::error!(error = %e, "generative API call failed");
        PlanError::from(e)
    })?;

    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            tracing::error!("generative API returned no text");
            return Err(PlanError::EmptyResponse);
        }
    };

    let plan: LessonPlan = serde_json::from_str(&text).map_err(|e| {
        tracing::error!(error = %e, "failed to decode lesson plan");
        PlanError::from(e)
    })?;

    tracing::info!(
        session = %plan.session,
        sections = plan.sections.len(),
        "lesson plan generated"
    );

    Ok(plan)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::plan::request::{Contents, DEFAULT_MODEL, GenerationRequest};

    /// Canned reply for [`MockClient`].
    pub(crate) enum Reply {
        Text(String),
        Nothing,
        Status(u16),
    }

    /// Test double that records requests and returns a canned reply.
    pub(crate) struct MockClient {
        reply: Reply,
        pub calls: AtomicUsize,
        pub last_request: Mutex<Option<GenerationRequest>>,
    }

    impl MockClient {
        pub(crate) fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeClient for MockClient {
        async fn generate(
            &self,
            _credential: &str,
            request: &GenerationRequest,
        ) -> Result<Option<String>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Reply::Text(t) => Ok(Some(t.clone())),
                Reply::Nothing => Ok(None),
                Reply::Status(s) => Err(ClientError::Status {
                    status: *s,
                    body: "rejected".to_string(),
                }),
            }
        }
    }

    pub(crate) const THREE_SECTIONS: &str = r#"{
        "level": "Niveau 4", "period": "Période 3", "week": "Semaine 2", "session": "Séance 3",
        "sections": [
            {"id": 1, "title": "Acte de parole", "duration": "20 min", "content": ["a"], "type": "speaking"},
            {"id": 2, "title": "Point de langue", "duration": "15 min", "content": ["b"], "type": "writing"},
            {"id": 3, "title": "Lecture", "duration": "25 min", "content": ["c"], "type": "reading"}
        ]
    }"#;

    fn forest() -> LessonContext {
        LessonContext::new("Niveau 4", "Période 3", "Semaine 2", "La forêt")
    }

    #[tokio::test]
    async fn decodes_plan_from_response_text() {
        let client = MockClient::new(Reply::Text(THREE_SECTIONS.to_string()));
        let plan = generate_lesson_plan(&client, Some("key"), DEFAULT_MODEL, &forest(), &[])
            .await
            .unwrap();
        assert_eq!(plan.sections.len(), 3);
        assert_eq!(client.calls(), 1);

        let sent = client.last_request.lock().unwrap().clone().unwrap();
        assert!(matches!(sent.contents, Contents::Text(_)));
    }

    #[tokio::test]
    async fn missing_credential_skips_network() {
        let client = MockClient::new(Reply::Text(THREE_SECTIONS.to_string()));
        for credential in [None, Some(""), Some("   ")] {
            let err = generate_lesson_plan(&client, credential, DEFAULT_MODEL, &forest(), &[])
                .await
                .unwrap_err();
            assert!(matches!(err, PlanError::MissingCredential));
        }
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn no_text_is_empty_response() {
        let client = MockClient::new(Reply::Nothing);
        let err = generate_lesson_plan(&client, Some("key"), DEFAULT_MODEL, &forest(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::EmptyResponse));
        assert_eq!(err.kind(), "empty_response");

        let client = MockClient::new(Reply::Text("  ".to_string()));
        let err = generate_lesson_plan(&client, Some("key"), DEFAULT_MODEL, &forest(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::EmptyResponse));
    }

    #[tokio::test]
    async fn malformed_json_is_decode_error() {
        let client = MockClient::new(Reply::Text("{\"level\": \"Niveau 4\"".to_string()));
        let err = generate_lesson_plan(&client, Some("key"), DEFAULT_MODEL, &forest(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::Decode(_)), "got {err:?}");
        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn transport_errors_propagate_unchanged() {
        let client = MockClient::new(Reply::Status(403));
        let err = generate_lesson_plan(&client, Some("key"), DEFAULT_MODEL, &forest(), &[])
            .await
            .unwrap_err();
        match err {
            PlanError::Transport(ClientError::Status { status, .. }) => assert_eq!(status, 403),
            other => panic!("expected transport error, got {other:?}"),
        }
        assert_eq!(client.calls(), 1, "no retry");
    }
}
