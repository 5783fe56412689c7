// ============================================================================
// RECURSION CONSTANTS
// ============================================================================

/// Default maximum nesting depth of one mapping call
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Nesting depth of the bean currently being mapped
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecursionDepth(usize);

impl RecursionDepth {
    /// Depth before the top-level bean is entered
    pub const ZERO: Self = Self(0);

    /// One level deeper
    pub const fn increment(self) -> Self {
        Self(self.0 + 1)
    }

    /// One level shallower
    pub const fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Whether this depth is beyond `limit`
    pub const fn exceeds_limit(self, limit: usize) -> bool {
        self.0 > limit
    }

    /// Depth as a number
    pub const fn get(self) -> usize {
        self.0
    }
}

// ============================================================================
// SETTINGS CONSTANTS
// ============================================================================

/// Whether default converters are registered unless configured otherwise
pub const DEFAULT_REGISTER_DEFAULT_CONVERTERS: bool = true;

/// Whether a matched null source clears an optional target unless configured otherwise
pub const DEFAULT_CLEAR_ON_NULL: bool = true;
