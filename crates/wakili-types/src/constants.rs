//! System-wide constants for the Wakili dispatch core.

/// Minimum allowed star rating.
pub const MIN_STARS: u8 = 1;

/// Maximum allowed star rating.
pub const MAX_STARS: u8 = 5;

/// Default number of ranked providers offered each case.
pub const DEFAULT_TOP_K: usize = 10;

/// Default API listen port.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default seconds before a still-searching case is swept to CANCELLED.
pub const DEFAULT_SEARCH_TTL_SECS: u64 = 900;

/// Default per-request gateway timeout in seconds.
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Per-identity event channel depth. Overflow drops events (at-most-once).
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Settle-once cache size (number of case IDs to remember).
pub const SETTLED_CASE_CACHE_SIZE: usize = 500_000;

/// Maximum audit entries retained in memory before pruning oldest.
pub const MAX_AUDIT_ENTRIES: usize = 100_000;

/// Maximum pending gateway pushes retained before pruning oldest.
pub const MAX_PENDING_PUSHES: usize = 100_000;

/// Timestamp format the gateway expects in push passwords.
pub const GATEWAY_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Transaction type sent with every customer push.
pub const GATEWAY_TRANSACTION_TYPE: &str = "CustomerPayBillOnline";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name.
pub const SERVICE_NAME: &str = "Wakili";
