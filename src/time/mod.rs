//! Device clock, its network synchronization and calendar conversion.

pub mod calendar;
pub mod clock;
pub mod sync;

pub use calendar::{DateTime, FatTimestamp};
pub use clock::{Clock, SystemTicks, TickSource};
pub use sync::{SyncPolicy, TimeSync};
