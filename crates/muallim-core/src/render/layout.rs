//! Plan-to-layout mapping: header, one card per section, session markers.
//!
//! Pure and total: every plan produces a layout, with all text carried
//! verbatim (no truncation).

use crate::plan::types::{LessonPlan, LessonSection};

use super::theme::Theme;

/// Static institutional labels in the header's left block.
pub const INSTITUTION_LABELS: [&str; 2] = ["Royaume du Maroc", "Ministère de l'Éducation Nationale"];

/// Number of session markers in the footer.
pub const SESSION_COUNT: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub institution: [&'static str; 2],
    pub level: String,
    pub period: String,
    pub week: String,
    pub session: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    /// Rendering key, copied from the section id.
    pub key: i64,
    pub theme: Theme,
    pub duration: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMarker {
    pub label: String,
    pub active: bool,
}

/// Everything needed to draw the card page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    pub header: Header,
    /// Equal-width columns, in section order.
    pub cards: Vec<CardView>,
    pub markers: Vec<SessionMarker>,
}

impl CardView {
    fn from_section(section: &LessonSection) -> Self {
        Self {
            key: section.id,
            theme: Theme::for_activity(&section.activity),
            duration: section.duration.clone(),
            title: section.title.clone(),
            subtitle: section.subtitle.clone(),
            bullets: section.content.clone(),
        }
    }
}

/// The five footer markers; marker `n` is active when `session` contains `n`.
pub fn session_markers(session: &str) -> Vec<SessionMarker> {
    (1..=SESSION_COUNT)
        .map(|n| SessionMarker {
            label: format!("Séance {n}"),
            active: session.contains(&n.to_string()),
        })
        .collect()
}

/// Build the layout for a plan.
pub fn build_layout(plan: &LessonPlan) -> CardLayout {
    CardLayout {
        header: Header {
            institution: INSTITUTION_LABELS,
            level: plan.level.clone(),
            period: plan.period.clone(),
            week: plan.week.clone(),
            session: plan.session.clone(),
        },
        cards: plan.sections.iter().map(CardView::from_section).collect(),
        markers: session_markers(&plan.session),
    }
}
