/// Default grace period around a slot's start, in milliseconds (15 minutes).
pub const DEFAULT_GRACE_PERIOD_MS: i64 = 15 * 60 * 1000;

/// Longest accepted grace period (one day). Larger values overflow slot arithmetic.
pub const MAX_GRACE_PERIOD_MS: i64 = 24 * 60 * 60 * 1000;

/// How often the lateness sweeper runs, in milliseconds.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60_000;

/// Max active (non-cancelled, non-no-show) bookings a student may hold per day.
pub const MAX_ACTIVE_BOOKINGS_PER_DAY: usize = 2;

pub const MAX_RESOURCES: usize = 10_000;
pub const MAX_NAME_LEN: usize = 256;
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// First and last hour (24h) of the standard daily slot catalog.
pub const CATALOG_FIRST_HOUR: u32 = 9;
pub const CATALOG_LAST_HOUR: u32 = 17;
