//! Card rendering: theme selection, layout model, HTML output.

pub mod html;
pub mod layout;
pub mod theme;

pub use html::{RenderOptions, escape_html, render_html};
pub use layout::{CardLayout, CardView, Header, SessionMarker, build_layout, session_markers};
pub use theme::{Icon, Theme};

use crate::plan::types::LessonPlan;

/// Render a plan straight to an HTML page.
pub fn render_plan_html(plan: &LessonPlan, options: RenderOptions) -> String {
    render_html(&build_layout(plan), options)
}
