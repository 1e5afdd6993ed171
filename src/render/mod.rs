// src/render/mod.rs

//! Widget presentation.
//!
//! `render` is a pure function from a widget and the site settings to a
//! `Presentation`: which of the five visual shapes to mount, where, and which
//! interactive elements exist. It owns no timing. `html` turns a presentation
//! into markup for hosts that mount HTML.
//!
//! Interactive element ids are scoped by widget id so a host can bind click
//! handlers unambiguously when widgets render one after another.

use crate::catalog::{GlobalSettings, Position, WidgetDefinition, WidgetType};

pub mod html;

pub use html::MarkupOptions;

/// Id of the shared modal overlay element
pub const OVERLAY_ID: &str = "widgetic-overlay";

pub fn button_element_id(widget_id: &str) -> String {
    format!("widgetic-btn-{}", widget_id)
}

pub fn close_element_id(widget_id: &str) -> String {
    format!("widgetic-close-{}", widget_id)
}

pub fn bubble_element_id(widget_id: &str) -> String {
    format!("widgetic-bubble-{}", widget_id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colors {
    pub background: String,
    pub text: String,
}

/// Call-to-action link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonLink {
    pub element_id: String,
    pub label: String,
    pub url: String,
}

/// The content card shared by every variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub widget_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub button: Option<ButtonLink>,
    /// Close affordance element id, when one is rendered
    pub close_id: Option<String>,
    pub branding: bool,
    pub colors: Colors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLayout {
    /// Floating toast in a screen corner
    Toast { corner: Position },
    /// Full-height panel pinned to a screen edge
    SlidePanel { side: Side },
}

/// Where a floating button's panel opens, relative to the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelAnchor {
    /// Vertical direction the panel grows in
    pub opens: Edge,
    /// Horizontal edge the panel is aligned to
    pub align: Side,
}

impl PanelAnchor {
    /// Open toward page center from the trigger's corner
    pub fn for_corner(corner: Position) -> Self {
        Self {
            opens: if corner.is_top() { Edge::Bottom } else { Edge::Top },
            align: if corner.is_left() { Side::Left } else { Side::Right },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Card { layout: CardLayout, card: Card },
    /// Centered card over a full-viewport overlay; overlay click dismisses
    Modal { card: Card },
    /// Full-width horizontal bar
    Bar { edge: Edge, card: Card },
    /// Circular trigger plus a collapsible panel
    FloatingButton {
        corner: Position,
        bubble_id: String,
        panel: PanelAnchor,
        card: Card,
    },
}

impl Presentation {
    pub fn card(&self) -> &Card {
        match self {
            Presentation::Card { card, .. }
            | Presentation::Modal { card }
            | Presentation::Bar { card, .. }
            | Presentation::FloatingButton { card, .. } => card,
        }
    }

    pub fn widget_id(&self) -> &str {
        &self.card().widget_id
    }

    pub fn has_overlay(&self) -> bool {
        matches!(self, Presentation::Modal { .. })
    }

    /// Every element a host must bind a click handler to
    pub fn interactive_ids(&self) -> Vec<String> {
        let card = self.card();
        let mut ids = Vec::new();
        if let Presentation::FloatingButton { bubble_id, .. } = self {
            ids.push(bubble_id.clone());
        }
        if let Some(close_id) = &card.close_id {
            ids.push(close_id.clone());
        }
        if let Some(button) = &card.button {
            ids.push(button.element_id.clone());
        }
        if self.has_overlay() {
            ids.push(OVERLAY_ID.to_string());
        }
        ids
    }
}

fn build_card(widget: &WidgetDefinition, settings: &GlobalSettings, close: bool, branding: bool) -> Card {
    let content = &widget.content;
    Card {
        widget_id: widget.id.clone(),
        title: content.title.clone(),
        description: content.description.clone(),
        button: content.button().map(|(label, url)| ButtonLink {
            element_id: button_element_id(&widget.id),
            label: label.to_string(),
            url: url.to_string(),
        }),
        close_id: close.then(|| close_element_id(&widget.id)),
        branding,
        colors: Colors {
            background: settings.background_color().to_string(),
            text: settings.text_color().to_string(),
        },
    }
}

/// Build the presentation for a widget under the site settings
pub fn render(widget: &WidgetDefinition, settings: &GlobalSettings) -> Presentation {
    let close = settings.show_close_button();
    let branding = settings.show_branding();
    let position = settings.position;

    match widget.widget_type {
        WidgetType::PopupModal => Presentation::Modal {
            card: build_card(widget, settings, close, branding),
        },
        WidgetType::AnnouncementBar | WidgetType::Banner => Presentation::Bar {
            edge: if position.is_top() { Edge::Top } else { Edge::Bottom },
            card: build_card(widget, settings, close, false),
        },
        WidgetType::FloatingButton => Presentation::FloatingButton {
            corner: position,
            bubble_id: bubble_element_id(&widget.id),
            panel: PanelAnchor::for_corner(position),
            card: build_card(widget, settings, false, branding),
        },
        WidgetType::SlideIn => Presentation::Card {
            layout: CardLayout::SlidePanel {
                side: if position.is_left() { Side::Left } else { Side::Right },
            },
            card: build_card(widget, settings, close, branding),
        },
        WidgetType::Notification => Presentation::Card {
            layout: CardLayout::Toast { corner: position },
            card: build_card(widget, settings, close, branding),
        },
    }
}
