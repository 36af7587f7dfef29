/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Upper bound on the summed damage reduction of all active modules.
    pub reduction_cap: f64,

    /// Interval in ticks between `on_second_tick` handler calls.
    pub second_interval: u32,

    /// A status effect is reapplied once its remaining duration is at or
    /// below this many ticks.
    pub status_refresh_window: u32,
}

impl EngineConfig {
    // ===== compile-time limits =====
    /// Module handles are `u16`; the catalog refuses anything past this.
    pub const MAX_MODULES: usize = u16::MAX as usize;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_REDUCTION_CAP: f64 = 0.9;
    pub const DEFAULT_SECOND_INTERVAL: u32 = 20;
    pub const DEFAULT_STATUS_REFRESH_WINDOW: u32 = 10;

    pub fn new() -> Self {
        Self {
            reduction_cap: Self::DEFAULT_REDUCTION_CAP,
            second_interval: Self::DEFAULT_SECOND_INTERVAL,
            status_refresh_window: Self::DEFAULT_STATUS_REFRESH_WINDOW,
        }
    }

    #[must_use]
    pub fn with_reduction_cap(mut self, cap: f64) -> Self {
        self.reduction_cap = cap.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_second_interval(mut self, ticks: u32) -> Self {
        self.second_interval = ticks;
        self
    }

    #[must_use]
    pub fn with_status_refresh_window(mut self, ticks: u32) -> Self {
        self.status_refresh_window = ticks;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
