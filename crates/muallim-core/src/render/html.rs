//! HTML rendering of a [`CardLayout`].
//!
//! Produces a single self-contained page (inline CSS and SVG, no scripts
//! beyond the print button). Text is escaped but never truncated.

use super::layout::{CardLayout, CardView, SessionMarker};

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit the back/print navigation. It is hidden in print either way.
    pub chrome: bool,
    /// Target of the back button when chrome is on.
    pub back_href: &'static str,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            chrome: true,
            back_href: "/",
        }
    }
}

impl RenderOptions {
    /// Options for a standalone file: no navigation.
    pub fn standalone() -> Self {
        Self {
            chrome: false,
            ..Self::default()
        }
    }
}

/// Escape text for HTML element and attribute content.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
*{box-sizing:border-box}
body{margin:0;font-family:"Segoe UI",system-ui,sans-serif;background:#e5e7eb;color:#1f2937}
.stage{min-height:100vh;display:flex;align-items:center;justify-content:center;padding:2rem}
.canvas{position:relative;width:100%;max-width:1400px;aspect-ratio:16/9;background:#fff;
  border:8px double rgba(202,138,4,.2);border-radius:.75rem;box-shadow:0 25px 50px -12px rgba(0,0,0,.25);
  display:flex;flex-direction:column}
.header{display:flex;justify-content:space-between;align-items:flex-start;padding:1.5rem 3rem .5rem}
.institution{width:12rem;opacity:.7}
.institution h1{margin:0;font:700 .75rem Georgia,serif;letter-spacing:.1em;text-transform:uppercase;color:#6b7280}
.institution h2{margin:0;font-size:.625rem;font-weight:400;color:#9ca3af}
.title{flex:1;text-align:center}
.title-box{display:inline-block;padding:.75rem 2.5rem;border:1px solid #eab308;border-top:0;
  border-radius:0 0 1.5rem 1.5rem;box-shadow:0 4px 6px -1px rgba(0,0,0,.1)}
.level{margin:0;font:800 2.25rem Georgia,serif;color:#4338ca}
.tags{display:flex;justify-content:center;gap:.75rem;margin-top:.25rem;font-size:.875rem;font-weight:600}
.tag{padding:.125rem .5rem;border-radius:.25rem}
.tag-period{color:#0f766e;background:#f0fdfa}
.tag-week{color:#ea580c;background:#fff7ed}
.tag-session{color:#7e22ce;background:#faf5ff}
.spacer{width:12rem}
.columns{flex:1;display:grid;gap:1.5rem;padding:.5rem 2rem;align-items:stretch}
.card{position:relative;display:flex;flex-direction:column;min-width:0}
.arch{flex:1;display:flex;flex-direction:column;background:#fff;border:2px solid var(--accent);
  border-top-width:4px;border-bottom-width:4px;border-radius:3rem 3rem .75rem .75rem;overflow:visible}
.arch-head{background:var(--accent);color:#fff;text-align:center;padding:2rem .75rem .75rem;border-radius:2.75rem 2.75rem 0 0}
.icon{display:inline-flex;padding:.375rem;border-radius:9999px;background:#fff;color:var(--accent);margin-bottom:.25rem}
.arch-head h3{margin:0;font:700 1.125rem Georgia,serif;line-height:1.25}
.arch-head p{margin:.25rem 0 0;font-size:.75rem;opacity:.9}
.arch-body{flex:1;padding:1rem;background:linear-gradient(#fff,var(--tint))}
.arch-body ul{list-style:none;margin:0;padding:0}
.arch-body li{display:flex;align-items:flex-start;margin-bottom:.5rem;font-size:.875rem;line-height:1.6}
.dot{flex-shrink:0;width:.375rem;height:.375rem;margin:.55rem .5rem 0 0;border-radius:9999px;background:var(--accent)}
.gold{height:.375rem;background:linear-gradient(90deg,#facc15,#fef08a,#facc15)}
.badge{position:absolute;top:-.75rem;right:-.75rem;z-index:2;width:3rem;height:3rem;border:2px solid #fb923c;
  border-radius:9999px;background:#fff;display:flex;align-items:center;justify-content:center;
  text-align:center;font-size:.625rem;font-weight:700;color:#374151;line-height:1}
.timeline{position:relative;width:75%;margin:.5rem auto 2rem;height:.25rem;background:#fde68a;border-radius:9999px;
  display:flex;align-items:center;justify-content:space-between}
.marker{position:relative}
.marker .pin{width:.75rem;height:.75rem;border-radius:9999px;border:2px solid #d1d5db;background:#fff}
.marker span{position:absolute;top:1.1rem;left:50%;transform:translateX(-50%);white-space:nowrap;
  font-size:.625rem;font-weight:700;color:#9ca3af}
.marker.active .pin{background:#eab308;border-color:#ca8a04;transform:scale(1.25)}
.marker.active span{color:#a16207}
.nav{position:fixed;top:1rem;right:1rem;z-index:50;display:flex;gap:.5rem}
.nav a,.nav button{border:1px solid #e5e7eb;border-radius:9999px;padding:.6rem 1rem;background:#fff;
  color:#374151;font:inherit;text-decoration:none;cursor:pointer}
.nav button{background:#2563eb;color:#fff;border-color:#3b82f6}
@media print{
  @page{size:landscape;margin:0}
  .no-print{display:none!important}
  body{background:#fff}
  .stage{padding:0;min-height:0;width:100vw;height:100vh}
  .canvas{border:none;box-shadow:none;width:100%;height:100%;max-width:none;aspect-ratio:auto;border-radius:0}
}
"#;

fn render_card(out: &mut String, card: &CardView) {
    out.push_str(&format!(
        "<div class=\"card card-{name}\" data-key=\"{key}\" style=\"--accent:{accent};--tint:{tint}\">",
        name = card.theme.name,
        key = card.key,
        accent = card.theme.accent,
        tint = card.theme.tint,
    ));
    out.push_str(&format!(
        "<div class=\"badge\">{}</div>",
        escape_html(&card.duration)
    ));
    out.push_str("<div class=\"arch\"><div class=\"arch-head\">");
    out.push_str(&format!("<div class=\"icon\">{}</div>", card.theme.icon.svg()));
    out.push_str(&format!("<h3>{}</h3>", escape_html(&card.title)));
    if let Some(subtitle) = &card.subtitle {
        out.push_str(&format!("<p>{}</p>", escape_html(subtitle)));
    }
    out.push_str("</div><div class=\"arch-body\"><ul>");
    for bullet in &card.bullets {
        out.push_str(&format!(
            "<li dir=\"auto\"><span class=\"dot\"></span><span>{}</span></li>",
            escape_html(bullet)
        ));
    }
    out.push_str("</ul></div><div class=\"gold\"></div></div></div>");
}

fn render_marker(out: &mut String, marker: &SessionMarker) {
    let class = if marker.active { "marker active" } else { "marker" };
    out.push_str(&format!(
        "<div class=\"{class}\"><div class=\"pin\"></div><span>{}</span></div>",
        escape_html(&marker.label)
    ));
}

/// Render a full HTML page for a layout.
pub fn render_html(layout: &CardLayout, options: RenderOptions) -> String {
    let header = &layout.header;
    let mut out = String::with_capacity(16 * 1024);

    out.push_str("<!DOCTYPE html><html lang=\"fr\"><head><meta charset=\"utf-8\">");
    out.push_str(&format!(
        "<title>{} - {} - {}</title>",
        escape_html(&header.level),
        escape_html(&header.period),
        escape_html(&header.week)
    ));
    out.push_str("<style>");
    out.push_str(STYLE);
    out.push_str("</style></head><body>");

    if options.chrome {
        out.push_str(&format!(
            "<nav class=\"nav no-print\"><a href=\"{}\" title=\"Retour\">Retour</a>\
             <button type=\"button\" onclick=\"window.print()\" title=\"Imprimer / Sauvegarder PDF\">Imprimer</button></nav>",
            escape_html(options.back_href)
        ));
    }

    out.push_str("<div class=\"stage\"><div class=\"canvas\">");

    out.push_str("<header class=\"header\"><div class=\"institution\">");
    out.push_str(&format!(
        "<h1>{}</h1><h2>{}</h2>",
        escape_html(header.institution[0]),
        escape_html(header.institution[1])
    ));
    out.push_str("</div><div class=\"title\"><div class=\"title-box\">");
    out.push_str(&format!("<h1 class=\"level\">{}</h1>", escape_html(&header.level)));
    out.push_str(&format!(
        "<div class=\"tags\"><span class=\"tag tag-period\">{}</span>\
         <span class=\"tag tag-week\">{}</span><span class=\"tag tag-session\">{}</span></div>",
        escape_html(&header.period),
        escape_html(&header.week),
        escape_html(&header.session)
    ));
    out.push_str("</div></div><div class=\"spacer\"></div></header>");

    out.push_str(&format!(
        "<main class=\"columns\" style=\"grid-template-columns:repeat({},minmax(0,1fr))\">",
        layout.cards.len().max(1)
    ));
    for card in &layout.cards {
        render_card(&mut out, card);
    }
    out.push_str("</main>");

    out.push_str("<footer class=\"timeline\">");
    for marker in &layout.markers {
        render_marker(&mut out, marker);
    }
    out.push_str("</footer></div></div></body></html>");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::types::{ActivityType, LessonPlan, LessonSection};
    use crate::render::layout::build_layout;

    fn plan() -> LessonPlan {
        LessonPlan {
            level: "Niveau 4".to_string(),
            period: "Période 3".to_string(),
            week: "Semaine 2".to_string(),
            session: "Séance 3".to_string(),
            sections: vec![
                LessonSection {
                    id: 1,
                    title: "Acte de parole".to_string(),
                    subtitle: Some("Les animaux <de la forêt>".to_string()),
                    duration: "20 min".to_string(),
                    content: vec!["Écouter & répéter".to_string()],
                    activity: ActivityType::Speaking,
                },
                LessonSection {
                    id: 2,
                    title: "Lecture".to_string(),
                    subtitle: None,
                    duration: "25 min".to_string(),
                    content: vec!["Lire le texte".to_string(), "Répondre".to_string()],
                    activity: ActivityType::Reading,
                },
            ],
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b a="x">'&'</b>"#),
            "&lt;b a=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn renders_header_cards_and_markers() {
        let html = render_html(&build_layout(&plan()), RenderOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Royaume du Maroc"));
        assert!(html.contains("<h1 class=\"level\">Niveau 4</h1>"));
        assert!(html.contains("Les animaux &lt;de la forêt&gt;"));
        assert!(html.contains("Écouter &amp; répéter"));
        assert!(html.contains("repeat(2,minmax(0,1fr))"));
        assert_eq!(html.matches("class=\"card ").count(), 2);
        assert_eq!(html.matches("class=\"marker").count(), 5);
        assert_eq!(html.matches("class=\"marker active\"").count(), 1);

        let speaking = html.find("card-speaking").unwrap();
        let reading = html.find("card-reading").unwrap();
        assert!(speaking < reading, "cards must keep section order");
    }

    #[test]
    fn chrome_is_optional_and_hidden_in_print() {
        let with = render_html(&build_layout(&plan()), RenderOptions::default());
        assert!(with.contains("class=\"nav no-print\""));
        assert!(with.contains("@media print"));
        assert!(with.contains(".no-print{display:none!important}"));

        let without = render_html(&build_layout(&plan()), RenderOptions::standalone());
        assert!(!without.contains("class=\"nav no-print\""));
    }

    #[test]
    fn subtitle_block_only_when_present() {
        let html = render_html(&build_layout(&plan()), RenderOptions::standalone());
        assert_eq!(html.matches("<p>").count(), 1);
    }
}
