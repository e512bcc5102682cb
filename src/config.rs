//! Tunable limits for the dashboard views.

/// Engine settings. `Default` gives the classic dashboard: debts due within
/// a week, five of them, and the five latest transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// How far ahead a pending debt's deadline may be to count as urgent.
    pub urgent_horizon_days: u32,

    /// Maximum number of urgent debts shown.
    pub urgent_limit: usize,

    /// Maximum number of recent transactions shown.
    pub recent_limit: usize,
}

impl LedgerConfig {
    pub const DEFAULT_URGENT_HORIZON_DAYS: u32 = 7;
    pub const DEFAULT_URGENT_LIMIT: usize = 5;
    pub const DEFAULT_RECENT_LIMIT: usize = 5;
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            urgent_horizon_days: Self::DEFAULT_URGENT_HORIZON_DAYS,
            urgent_limit: Self::DEFAULT_URGENT_LIMIT,
            recent_limit: Self::DEFAULT_RECENT_LIMIT,
        }
    }
}
