//! Interactive phase timeline: create, move and resize date-range bars on a
//! multi-year calendar by dragging.

pub mod config;
pub mod error;
pub mod model;
pub mod timeline;

pub use config::EngineConfig;
pub use error::{Result, TimelineError};
pub use model::{CalendarRange, CalendarWindow, Phase};
pub use timeline::{RenderBackend, TimelineAction, TimelineEngine};
