//! Visual theme per activity type.

use crate::plan::types::ActivityType;

/// Icon drawn in a card header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    SpeechBubble,
    Pen,
    Book,
}

impl Icon {
    /// Inline SVG markup, stroked with `currentColor`.
    pub fn svg(self) -> &'static str {
        match self {
            Self::SpeechBubble => {
                r#"<svg viewBox="0 0 24 24" width="20" height="20" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="M7.9 20A9 9 0 1 0 4 16.1L2 22Z"/></svg>"#
            }
            Self::Pen => {
                r#"<svg viewBox="0 0 24 24" width="20" height="20" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="m12 19 7-7 3 3-7 7-3-3z"/><path d="m18 13-1.5-7.5L2 2l3.5 14.5L13 18l5-5z"/><path d="m2 2 7.586 7.586"/><circle cx="11" cy="11" r="2"/></svg>"#
            }
            Self::Book => {
                r#"<svg viewBox="0 0 24 24" width="20" height="20" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="M2 3h6a4 4 0 0 1 4 4v14a3 3 0 0 0-3-3H2z"/><path d="M22 3h-6a4 4 0 0 0-4 4v14a3 3 0 0 1 3-3h7z"/></svg>"#
            }
        }
    }
}

/// Colours and icon for one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Theme {
    /// Stable name, also used as a CSS class suffix.
    pub name: &'static str,
    /// Border, header and bullet colour.
    pub accent: &'static str,
    /// Light tint behind the content.
    pub tint: &'static str,
    pub icon: Icon,
}

impl Theme {
    pub const SPEAKING: Theme = Theme {
        name: "speaking",
        accent: "#1d4ed8",
        tint: "#eff6ff",
        icon: Icon::SpeechBubble,
    };

    pub const WRITING: Theme = Theme {
        name: "writing",
        accent: "#0f766e",
        tint: "#f0fdfa",
        icon: Icon::Pen,
    };

    pub const READING: Theme = Theme {
        name: "reading",
        accent: "#7e22ce",
        tint: "#faf5ff",
        icon: Icon::Book,
    };

    /// Theme for an activity. Unrecognised values get the speaking theme.
    pub fn for_activity(activity: &ActivityType) -> Theme {
        match activity {
            ActivityType::Writing => Self::WRITING,
            ActivityType::Reading => Self::READING,
            ActivityType::Speaking | ActivityType::Other(_) => Self::SPEAKING,
        }
    }
}
