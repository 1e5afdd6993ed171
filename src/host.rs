// src/host.rs
// Render targets the scheduler mounts presentations into

use std::io::Write;
use tracing::{info, warn};

use crate::render::{MarkupOptions, Presentation};

/// The isolated container (plus optional overlay) owned by the engine.
/// Nothing else mutates it.
pub trait RenderHost: Send {
    /// Replace the container's content with `presentation` and make it visible
    fn show(&mut self, presentation: &Presentation);

    /// Hide the container and overlay
    fn hide(&mut self);

    /// Expand or collapse a floating button's panel
    fn set_expanded(&mut self, expanded: bool);
}

/// Writes mounted markup to a stream (stdout for the CLI)
pub struct TerminalHost<W: Write + Send> {
    out: W,
    options: MarkupOptions,
    mounted: Option<String>,
}

impl TerminalHost<std::io::Stdout> {
    pub fn stdout(options: MarkupOptions) -> Self {
        Self::new(std::io::stdout(), options)
    }
}

impl<W: Write + Send> TerminalHost<W> {
    pub fn new(out: W, options: MarkupOptions) -> Self {
        Self {
            out,
            options,
            mounted: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!("Render host write failed: {}", e);
        }
    }
}

impl<W: Write + Send> RenderHost for TerminalHost<W> {
    fn show(&mut self, presentation: &Presentation) {
        let widget_id = presentation.widget_id().to_string();
        info!(
            "Mounted widget {} (handlers: {})",
            widget_id,
            presentation.interactive_ids().join(", ")
        );
        let document = presentation.to_document(&self.options);
        self.emit(&document);
        self.mounted = Some(widget_id);
    }

    fn hide(&mut self) {
        if let Some(widget_id) = self.mounted.take() {
            info!("Hid widget {}", widget_id);
            self.emit(&format!("<!-- hidden: {} -->", widget_id));
        }
    }

    fn set_expanded(&mut self, expanded: bool) {
        if let Some(widget_id) = &self.mounted {
            let line = format!(
                "<!-- {}: {} -->",
                if expanded { "expanded" } else { "collapsed" },
                widget_id
            );
            self.emit(&line);
        }
    }
}
