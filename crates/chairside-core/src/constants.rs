/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

/// Expansion horizon applied when a recurrence rule carries no end date.
///
/// Together with [`DEFAULT_MAX_OCCURRENCES`] this guarantees the expander
/// terminates even for rules with neither bound supplied.
pub const DEFAULT_EXPANSION_HORIZON_DAYS: u64 = 90;

/// Occurrence cap applied when a recurrence rule carries no explicit cap.
pub const DEFAULT_MAX_OCCURRENCES: u32 = 52;
