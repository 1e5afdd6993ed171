// src/scheduler/mod.rs

//! Rotation state machine.
//!
//! The scheduler owns all mutable engine state: per-widget display counters,
//! the rotation cursor and the single outstanding timer. Timers are plain
//! data (`PendingTimer`); whoever drives the scheduler sleeps for `delay` and
//! calls `fire(id)`. That keeps the machine synchronous and lets tests step
//! time by hand.
//!
//! States: Idle -> Selecting -> Visible -> HiddenCooldown -> Selecting ...,
//! ending in Exhausted once every widget hit its loop limit.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::behavior::behavior_for;
use crate::catalog::{Catalog, GlobalSettings, WidgetDefinition, WidgetType};
use crate::config::DEFAULT_INITIAL_DELAY_MS;
use crate::host::RenderHost;
use crate::render::render;
use crate::report::{EventKind, EventReporter};
use crate::store::DisplayCountStore;

pub mod state;

pub use state::{Interaction, PendingTimer, RotationState, TimerKind};

/// A widget plus its scheduler-owned counters
#[derive(Debug, Clone)]
pub struct RotationEntry {
    pub widget: WidgetDefinition,
    pub display_count: u32,
    /// 0 = unlimited
    pub loop_limit: u32,
}

impl RotationEntry {
    pub fn is_eligible(&self) -> bool {
        self.loop_limit == 0 || self.display_count < self.loop_limit
    }

    fn limit_label(&self) -> String {
        if self.loop_limit == 0 {
            "∞".to_string()
        } else {
            self.loop_limit.to_string()
        }
    }
}

/// Position in the catalog plus the one outstanding timer
#[derive(Debug, Clone, Default)]
pub struct RotationCursor {
    /// None until the first widget is shown
    pub current_index: Option<usize>,
    pub timer: Option<PendingTimer>,
}

/// Everything one engine instance knows about its site
#[derive(Debug, Clone)]
pub struct EngineState {
    pub entries: Vec<RotationEntry>,
    pub settings: GlobalSettings,
    pub cursor: RotationCursor,
}

pub struct RotationScheduler {
    engine: EngineState,
    phase: RotationState,
    next_timer_id: u64,
    initial_delay: Duration,
    // Floating button: whether this showing already reported its view
    view_reported: bool,
    store: DisplayCountStore,
    reporter: EventReporter,
    host: Box<dyn RenderHost>,
}

impl RotationScheduler {
    /// Build a scheduler over a loaded catalog, seeding counters from the store
    pub fn new(
        catalog: Catalog,
        store: DisplayCountStore,
        reporter: EventReporter,
        host: Box<dyn RenderHost>,
    ) -> Self {
        let entries = catalog
            .widgets
            .into_iter()
            .map(|widget| RotationEntry {
                display_count: store.get(&widget.id),
                loop_limit: widget.loop_limit(),
                widget,
            })
            .collect();

        Self {
            engine: EngineState {
                entries,
                settings: catalog.settings,
                cursor: RotationCursor::default(),
            },
            phase: RotationState::Idle,
            next_timer_id: 1,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            view_reported: false,
            store,
            reporter,
            host,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn state(&self) -> RotationState {
        self.phase
    }

    pub fn pending_timer(&self) -> Option<PendingTimer> {
        self.engine.cursor.timer
    }

    pub fn entries(&self) -> &[RotationEntry] {
        &self.engine.entries
    }

    pub fn display_count(&self, widget_id: &str) -> Option<u32> {
        self.engine
            .entries
            .iter()
            .find(|e| e.widget.id == widget_id)
            .map(|e| e.display_count)
    }

    /// Widget currently mounted, if any
    pub fn current_widget(&self) -> Option<&WidgetDefinition> {
        match self.phase {
            RotationState::Visible { index, .. } => {
                self.engine.entries.get(index).map(|e| &e.widget)
            }
            _ => None,
        }
    }

    /// No timer can ever fire again: exhausted, or idle without a start
    pub fn is_finished(&self) -> bool {
        match self.phase {
            RotationState::Exhausted => true,
            RotationState::Idle => self.engine.cursor.timer.is_none(),
            _ => false,
        }
    }

    /// Arm the initial delay. Empty catalogs stay idle.
    pub fn start(&mut self) {
        if self.phase != RotationState::Idle || self.engine.cursor.timer.is_some() {
            debug!("Rotation already started ({})", self.phase);
            return;
        }
        if self.engine.entries.is_empty() {
            info!("No widgets configured, rotation not started");
            return;
        }
        info!("Starting rotation over {} widgets", self.engine.entries.len());
        self.arm(TimerKind::InitialDelay, self.initial_delay);
    }

    /// Handle an elapsed timer. Returns false for stale or unknown ids.
    pub fn fire(&mut self, timer_id: u64) -> bool {
        let Some(timer) = self.engine.cursor.timer.take_if(|t| t.id == timer_id) else {
            debug!("Ignoring stale timer {}", timer_id);
            return false;
        };

        match (timer.kind, self.phase) {
            (TimerKind::InitialDelay, RotationState::Idle)
            | (TimerKind::Cooldown, RotationState::HiddenCooldown) => self.select_next(),
            (TimerKind::AutoHide, RotationState::Visible { .. }) => self.hide(),
            (kind, phase) => warn!("Timer {:?} fired in unexpected state {}", kind, phase),
        }
        true
    }

    /// Apply a user interaction to whatever widget is mounted
    pub fn interact(&mut self, interaction: Interaction) {
        let RotationState::Visible { index, expanded } = self.phase else {
            debug!("Ignoring {:?} while {}", interaction, self.phase);
            return;
        };
        let widget = &self.engine.entries[index].widget;
        let widget_id = widget.id.clone();
        let widget_type = widget.widget_type;
        let has_button = widget.content.button().is_some();
        // Floating panels render no close affordance; the trigger toggles instead
        let has_close =
            widget_type != WidgetType::FloatingButton && self.engine.settings.show_close_button();

        match interaction {
            Interaction::Dismiss if has_close => {
                self.reporter.report(&widget_id, EventKind::Dismiss);
                self.close_visible();
            }
            Interaction::OverlayClick if behavior_for(widget_type).uses_overlay() => {
                self.reporter.report(&widget_id, EventKind::Dismiss);
                self.close_visible();
            }
            Interaction::ButtonClick if has_button => {
                self.reporter.report(&widget_id, EventKind::Click);
            }
            Interaction::ToggleFloating if widget_type == WidgetType::FloatingButton => {
                if expanded {
                    self.host.set_expanded(false);
                    self.close_visible();
                } else {
                    self.phase = RotationState::Visible { index, expanded: true };
                    self.host.set_expanded(true);
                    if !self.view_reported {
                        self.view_reported = true;
                        self.reporter.report(&widget_id, EventKind::View);
                    }
                    self.reporter.report(&widget_id, EventKind::Click);
                }
            }
            other => debug!("Ignoring {:?} on {} widget {}", other, widget_type, widget_id),
        }
    }

    /// Apply an interaction only if `widget_id` is the mounted widget
    pub fn interact_on(&mut self, widget_id: &str, interaction: Interaction) {
        match self.current_widget() {
            Some(current) if current.id == widget_id => self.interact(interaction),
            _ => debug!("Ignoring {:?} for widget {} (not mounted)", interaction, widget_id),
        }
    }

    fn arm(&mut self, kind: TimerKind, delay: Duration) {
        if let Some(previous) = self.engine.cursor.timer.take() {
            warn!("Replacing outstanding {:?} timer with {:?}", previous.kind, kind);
        }
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        self.engine.cursor.timer = Some(PendingTimer { id, kind, delay });
    }

    fn select_next(&mut self) {
        self.phase = RotationState::Selecting;

        let total = self.engine.entries.len();
        let available = self.engine.entries.iter().filter(|e| e.is_eligible()).count();
        debug!("Available widgets: {}/{}", available, total);

        if available == 0 {
            info!("All widgets reached loop limit. Stopping.");
            self.exhaust();
            return;
        }

        let start = self.engine.cursor.current_index.map(|i| i + 1).unwrap_or(0);
        let found = (0..total)
            .map(|offset| (start + offset) % total)
            .find(|&i| self.engine.entries[i].is_eligible());

        match found {
            Some(index) => {
                self.engine.cursor.current_index = Some(index);
                self.show(index);
            }
            None => {
                warn!("No eligible widget found after a full scan; stopping rotation");
                self.exhaust();
            }
        }
    }

    fn show(&mut self, index: usize) {
        let entry = &mut self.engine.entries[index];
        entry.display_count += 1;
        info!(
            "Showing widget {:?} ({}/{})",
            entry.widget.content.title.as_deref().unwrap_or(&entry.widget.id),
            entry.display_count,
            entry.limit_label()
        );

        let widget_id = entry.widget.id.clone();
        let behavior = behavior_for(entry.widget.widget_type);
        self.store.set(&widget_id, entry.display_count);

        let presentation = render(&entry.widget, &self.engine.settings);
        self.host.show(&presentation);
        self.phase = RotationState::Visible { index, expanded: false };
        self.view_reported = false;

        if behavior.tracks_view_on_show() {
            self.reporter.report(&widget_id, EventKind::View);
        }
        if behavior.halts_rotation() {
            debug!("Widget {} holds rotation until closed", widget_id);
        } else {
            self.arm(TimerKind::AutoHide, self.engine.settings.show_time());
        }
    }

    fn hide(&mut self) {
        self.host.hide();
        self.phase = RotationState::HiddenCooldown;
        self.arm(TimerKind::Cooldown, self.engine.settings.hide_time());
    }

    /// Manual close: drop a pending auto-hide first so only the cooldown remains
    fn close_visible(&mut self) {
        if let Some(cancelled) = self.engine.cursor.timer.take() {
            debug!("Cancelled pending {:?} timer {}", cancelled.kind, cancelled.id);
        }
        self.hide();
    }

    fn exhaust(&mut self) {
        self.engine.cursor.timer = None;
        self.phase = RotationState::Exhausted;
    }
}
