// src/catalog/mod.rs

//! Widget catalog: the site's ordered widget definitions plus global settings.
//! All wire-format leniency (unknown type tags, stringly numbers, blank
//! strings) is resolved here so the rest of the engine sees closed types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub mod lenient;
pub mod source;

pub use source::{ConfigDocument, ConfigSource, HttpConfigSource};

pub const DEFAULT_BACKGROUND: &str = "#fff";
pub const DEFAULT_TEXT_COLOR: &str = "#000";
pub const DEFAULT_SHOW_SECS: u64 = 5;
pub const DEFAULT_HIDE_SECS: u64 = 8;

// ============================================================================
// Widget type
// ============================================================================

/// Visual/behavioral variant of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WidgetType {
    #[default]
    Notification,
    PopupModal,
    AnnouncementBar,
    Banner,
    SlideIn,
    FloatingButton,
}

impl WidgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Notification => "NOTIFICATION",
            WidgetType::PopupModal => "POPUP_MODAL",
            WidgetType::AnnouncementBar => "ANNOUNCEMENT_BAR",
            WidgetType::Banner => "BANNER",
            WidgetType::SlideIn => "SLIDE_IN",
            WidgetType::FloatingButton => "FLOATING_BUTTON",
        }
    }

    /// Parse a type tag; anything unrecognized is a notification
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "POPUP_MODAL" => WidgetType::PopupModal,
            "ANNOUNCEMENT_BAR" => WidgetType::AnnouncementBar,
            "BANNER" => WidgetType::Banner,
            "SLIDE_IN" => WidgetType::SlideIn,
            "FLOATING_BUTTON" => WidgetType::FloatingButton,
            _ => WidgetType::Notification,
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WidgetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WidgetType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(tag)) => WidgetType::from_tag(&tag),
            _ => WidgetType::default(),
        })
    }
}

// ============================================================================
// Position
// ============================================================================

/// Screen corner used to place non-bar widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::TopLeft => "TOP_LEFT",
            Position::TopRight => "TOP_RIGHT",
            Position::BottomLeft => "BOTTOM_LEFT",
            Position::BottomRight => "BOTTOM_RIGHT",
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "TOP_LEFT" => Position::TopLeft,
            "TOP_RIGHT" => Position::TopRight,
            "BOTTOM_LEFT" => Position::BottomLeft,
            _ => Position::BottomRight,
        }
    }

    pub fn is_top(&self) -> bool {
        matches!(self, Position::TopLeft | Position::TopRight)
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Position::TopLeft | Position::BottomLeft)
    }

    /// CSS class suffix, e.g. `bottom-right`
    pub fn css_suffix(&self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(tag)) => Position::from_tag(&tag),
            _ => Position::default(),
        })
    }
}

// ============================================================================
// Widget definition
// ============================================================================

/// Content payload of one widget
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetContent {
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    pub button_text: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    pub button_url: Option<String>,
    /// Normalized loop limit, 0 = unlimited
    #[serde(default, rename = "loop_count", deserialize_with = "lenient::loop_limit")]
    pub loop_limit: u32,
}

impl WidgetContent {
    /// Button label and target, only when both are present
    pub fn button(&self) -> Option<(&str, &str)> {
        match (&self.button_text, &self.button_url) {
            (Some(text), Some(url)) => Some((text.as_str(), url.as_str())),
            _ => None,
        }
    }
}

/// One promotional widget as delivered by the site config
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetDefinition {
    #[serde(deserialize_with = "lenient::string_or_number")]
    pub id: String,
    #[serde(default, rename = "type")]
    pub widget_type: WidgetType,
    #[serde(default, deserialize_with = "nullable_content")]
    pub content: WidgetContent,
}

fn nullable_content<'de, D>(deserializer: D) -> Result<WidgetContent, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<WidgetContent>::deserialize(deserializer)?.unwrap_or_default())
}

impl WidgetDefinition {
    pub fn new(id: impl Into<String>, widget_type: WidgetType) -> Self {
        Self {
            id: id.into(),
            widget_type,
            content: WidgetContent::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.content.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.content.description = Some(description.into());
        self
    }

    pub fn with_button(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.content.button_text = Some(text.into());
        self.content.button_url = Some(url.into());
        self
    }

    pub fn with_loop_limit(mut self, limit: u32) -> Self {
        self.content.loop_limit = limit;
        self
    }

    pub fn loop_limit(&self) -> u32 {
        self.content.loop_limit
    }
}

// ============================================================================
// Global settings
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleSettings {
    #[serde(default, rename = "backgroundColor", deserialize_with = "lenient::non_empty_string")]
    pub background_color: Option<String>,
    #[serde(default, rename = "textColor", deserialize_with = "lenient::non_empty_string")]
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimingSettings {
    #[serde(default, rename = "showTime", deserialize_with = "lenient::positive_seconds")]
    pub show_time: Option<u64>,
    #[serde(default, rename = "hideTime", deserialize_with = "lenient::positive_seconds")]
    pub hide_time: Option<u64>,
}

/// Affordance flags; a missing flag inside a present object means off
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct BehaviorFlags {
    #[serde(default, rename = "showCloseButton", deserialize_with = "lenient::flag")]
    pub show_close_button: bool,
    #[serde(default, rename = "showBranding", deserialize_with = "lenient::flag")]
    pub show_branding: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalSettings {
    #[serde(default)]
    pub position: Position,
    #[serde(default, deserialize_with = "nullable_default")]
    pub style: StyleSettings,
    #[serde(default, deserialize_with = "nullable_default")]
    pub timing: TimingSettings,
    /// Absent on older site configs, which always show close and branding
    #[serde(default)]
    pub behavior: Option<BehaviorFlags>,
}

fn nullable_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl GlobalSettings {
    pub fn background_color(&self) -> &str {
        self.style.background_color.as_deref().unwrap_or(DEFAULT_BACKGROUND)
    }

    pub fn text_color(&self) -> &str {
        self.style.text_color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR)
    }

    pub fn show_time(&self) -> Duration {
        Duration::from_secs(self.timing.show_time.unwrap_or(DEFAULT_SHOW_SECS))
    }

    pub fn hide_time(&self) -> Duration {
        Duration::from_secs(self.timing.hide_time.unwrap_or(DEFAULT_HIDE_SECS))
    }

    pub fn show_close_button(&self) -> bool {
        self.behavior.map(|b| b.show_close_button).unwrap_or(true)
    }

    pub fn show_branding(&self) -> bool {
        self.behavior.map(|b| b.show_branding).unwrap_or(true)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Ordered widget list plus settings for one site
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub widgets: Vec<WidgetDefinition>,
    pub settings: GlobalSettings,
}

impl Catalog {
    pub fn new(widgets: Vec<WidgetDefinition>, settings: GlobalSettings) -> Self {
        Self { widgets, settings }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}
