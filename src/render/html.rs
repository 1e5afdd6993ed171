// src/render/html.rs
// Markup serialization for presentations

use std::fmt::Write;

use super::{Card, CardLayout, Edge, OVERLAY_ID, Presentation, Side};

const CHAT_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24" fill="currentColor"><path d="M20 2H4c-1.1 0-2 .9-2 2v18l4-4h14c1.1 0 2-.9 2-2V4c0-1.1-.9-2-2-2z"/></svg>"#;

#[derive(Debug, Clone)]
pub struct MarkupOptions {
    /// Target of the "Powered by" attribution link
    pub branding_href: String,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            branding_href: "http://127.0.0.1:5000".to_string(),
        }
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn card_html(card: &Card, inline: bool, options: &MarkupOptions) -> String {
    let bg = escape(&card.colors.background);
    let txt = escape(&card.colors.text);
    // Bars lay text out in a row, so use inline elements
    let tag = if inline { "span" } else { "div" };
    let mut html = String::new();

    let _ = write!(html, r#"<div class="widgetic-card" style="background:{}; color:{};">"#, bg, txt);
    if let Some(close_id) = &card.close_id {
        let _ = write!(
            html,
            r#"<div class="widgetic-close" id="{}" role="button" aria-label="Close">&times;</div>"#,
            escape(close_id)
        );
    }
    html.push_str(r#"<div class="widgetic-content">"#);
    if let Some(title) = &card.title {
        let _ = write!(html, r#"<{tag} class="widgetic-title">{}</{tag}>"#, escape(title));
    }
    if let Some(description) = &card.description {
        let _ = write!(html, r#"<{tag} class="widgetic-desc">{}</{tag}>"#, escape(description));
    }
    if let Some(button) = &card.button {
        let _ = write!(
            html,
            r#"<a href="{}" target="_blank" rel="noopener" class="widgetic-btn" id="{}" style="color:{}; background:{}">{}</a>"#,
            escape(&button.url),
            escape(&button.element_id),
            bg,
            txt,
            escape(&button.label)
        );
    }
    html.push_str("</div>");
    if card.branding {
        let _ = write!(
            html,
            r#"<div class="widgetic-branding">Powered by <a href="{}" target="_blank" rel="noopener">Widgetic</a></div>"#,
            escape(&options.branding_href)
        );
    }
    html.push_str("</div>");
    html
}

fn side_class(side: Side) -> &'static str {
    match side {
        Side::Left => "left",
        Side::Right => "right",
    }
}

fn edge_class(edge: Edge) -> &'static str {
    match edge {
        Edge::Top => "top",
        Edge::Bottom => "bottom",
    }
}

impl Presentation {
    /// Classes for the engine's container element
    pub fn container_classes(&self) -> String {
        match self {
            Presentation::Card { layout: CardLayout::Toast { corner }, .. } => {
                format!("widgetic-container type-notification pos-{}", corner.css_suffix())
            }
            Presentation::Card { layout: CardLayout::SlidePanel { side }, .. } => {
                format!("widgetic-container type-slide pos-{}", side_class(*side))
            }
            Presentation::Modal { .. } => "widgetic-container type-modal".to_string(),
            Presentation::Bar { edge, .. } => {
                format!("widgetic-container type-bar pos-{}", edge_class(*edge))
            }
            Presentation::FloatingButton { corner, .. } => {
                format!("widgetic-container type-button pos-{}", corner.css_suffix())
            }
        }
    }

    /// Inner markup of the container
    pub fn to_html(&self, options: &MarkupOptions) -> String {
        match self {
            Presentation::Card { card, .. } | Presentation::Modal { card } => {
                card_html(card, false, options)
            }
            Presentation::Bar { card, .. } => card_html(card, true, options),
            Presentation::FloatingButton { bubble_id, panel, card, .. } => {
                let colors = &card.colors;
                format!(
                    r#"<div class="widgetic-float-btn" id="{}" role="button" aria-expanded="false" style="background:{}; color:{};">{}</div><div class="widgetic-float-content opens-{} align-{}">{}</div>"#,
                    escape(bubble_id),
                    escape(&colors.background),
                    escape(&colors.text),
                    CHAT_ICON,
                    edge_class(panel.opens),
                    side_class(panel.align),
                    card_html(card, false, options)
                )
            }
        }
    }

    /// Full container element, preceded by the overlay for modals
    pub fn to_document(&self, options: &MarkupOptions) -> String {
        let overlay = if self.has_overlay() {
            format!(r#"<div class="widgetic-overlay" id="{}"></div>"#, OVERLAY_ID)
        } else {
            String::new()
        };
        format!(
            r#"{}<div class="{}" data-widget-id="{}">{}</div>"#,
            overlay,
            self.container_classes(),
            escape(self.widget_id()),
            self.to_html(options)
        )
    }
}
