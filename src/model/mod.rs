pub mod calendar;
pub mod phase;

pub use calendar::{CalendarRange, CalendarWindow};
pub use phase::Phase;
