// src/behavior.rs
// Open/close contract per widget type

use crate::catalog::WidgetType;

/// How a widget appears once selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Rendered and visible immediately
    Auto,
    /// Rendered and visible immediately, with a dimming overlay
    AutoWithOverlay,
    /// Rendered collapsed; content opens on user click
    OnClick,
}

/// How a widget goes away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseMode {
    /// Auto-hides after `showTime`, or on explicit dismiss
    Timed,
    /// Stays until explicitly dismissed
    Sticky,
    /// Stays until the user collapses it via its trigger
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Behavior {
    pub open: OpenMode,
    pub close: CloseMode,
}

impl Behavior {
    pub fn auto_hides(&self) -> bool {
        self.close == CloseMode::Timed
    }

    /// Rotation waits for the user while this widget is shown
    pub fn halts_rotation(&self) -> bool {
        !self.auto_hides()
    }

    /// A collapsed trigger is not content; its view is counted on first open
    pub fn tracks_view_on_show(&self) -> bool {
        self.open != OpenMode::OnClick
    }

    pub fn uses_overlay(&self) -> bool {
        self.open == OpenMode::AutoWithOverlay
    }
}

pub fn behavior_for(widget_type: WidgetType) -> Behavior {
    match widget_type {
        WidgetType::FloatingButton => Behavior {
            open: OpenMode::OnClick,
            close: CloseMode::Toggle,
        },
        WidgetType::AnnouncementBar | WidgetType::Banner => Behavior {
            open: OpenMode::Auto,
            close: CloseMode::Sticky,
        },
        WidgetType::PopupModal => Behavior {
            open: OpenMode::AutoWithOverlay,
            close: CloseMode::Sticky,
        },
        WidgetType::Notification | WidgetType::SlideIn => Behavior {
            open: OpenMode::Auto,
            close: CloseMode::Timed,
        },
    }
}
