// src/lib.rs

pub mod behavior;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod http;
pub mod render;
pub mod report;
pub mod scheduler;
pub mod store;

pub use catalog::{Catalog, GlobalSettings, Position, WidgetDefinition, WidgetType};
pub use engine::{Engine, EngineHandle, EngineOptions};
pub use error::{Result, WidgetError};
pub use scheduler::{Interaction, RotationScheduler, RotationState};
