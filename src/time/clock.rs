use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Seconds between 1900-01-01 (NTP era 0) and 1970-01-01.
pub const NTP_UNIX_OFFSET: u32 = 2_208_988_800;

/// A free-running millisecond counter that wraps at `u32::MAX`.
pub trait TickSource: Send + Sync {
    fn millis(&self) -> u32;
}

/// Milliseconds since construction, truncated to 32 bits like a hardware
/// counter (wraps after about 49.7 days).
#[derive(Debug, Clone, Copy)]
pub struct SystemTicks {
    start: Instant,
}

impl SystemTicks {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for SystemTicks {
    fn millis(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// Wall-clock estimate: the last time the network told us plus the ticks
/// counted since.
///
/// `synced_secs == 0` means the clock has never been synchronized.
pub struct Clock {
    ticks: Box<dyn TickSource>,
    baseline: AtomicU32,
    synced_secs: AtomicU32,
    offset_secs: i32,
}

impl Clock {
    /// `offset_secs` is added to every reading, e.g. the local timezone.
    pub fn new(ticks: impl TickSource + 'static, offset_secs: i32) -> Self {
        Self {
            ticks: Box::new(ticks),
            baseline: AtomicU32::new(0),
            synced_secs: AtomicU32::new(0),
            offset_secs,
        }
    }

    /// Milliseconds since the last sync (or since the counter started),
    /// correct across one wrap of the tick counter.
    pub fn elapsed_millis(&self) -> u32 {
        self.ticks
            .millis()
            .wrapping_sub(self.baseline.load(Ordering::Relaxed))
    }

    pub fn is_synchronized(&self) -> bool {
        self.synced_secs.load(Ordering::Relaxed) != 0
    }

    /// Records a fresh reading of `unix_secs` taken now.
    pub fn synchronize(&self, unix_secs: u32) {
        self.baseline.store(self.ticks.millis(), Ordering::Relaxed);
        self.synced_secs.store(unix_secs, Ordering::Relaxed);
    }

    /// Seconds since 1970 in device local time.
    pub fn local_time(&self) -> u32 {
        self.synced_secs
            .load(Ordering::Relaxed)
            .wrapping_add_signed(self.offset_secs)
            .wrapping_add(self.elapsed_millis() / 1000)
    }

    /// `local_time` if there is a sync to base it on.
    pub fn synchronized_time(&self) -> Option<u32> {
        self.is_synchronized().then(|| self.local_time())
    }

    pub fn needs_resync(&self, interval: Duration) -> bool {
        !self.is_synchronized() || u128::from(self.elapsed_millis()) > interval.as_millis()
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("baseline", &self.baseline.load(Ordering::Relaxed))
            .field("synced_secs", &self.synced_secs.load(Ordering::Relaxed))
            .field("offset_secs", &self.offset_secs)
            .finish()
    }
}
