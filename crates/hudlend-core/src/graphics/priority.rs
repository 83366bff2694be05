//! Lease priority tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Service tier of a lease request.
///
/// High-priority requests are granted before any queued low-priority
/// request, regardless of arrival order. Requests within the same tier are
/// granted first-come, first-served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Render-path work that must not queue behind background jobs.
    High,
    /// Background work (asset uploads, texture generation, ...).
    Low,
}

impl Priority {
    /// Whether this is the high tier.
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// Label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Low => "LOW",
        }
    }
}

impl From<bool> for Priority {
    fn from(high_priority: bool) -> Self {
        if high_priority { Self::High } else { Self::Low }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_flag_maps_to_tier() {
        assert_eq!(Priority::from(true), Priority::High);
        assert_eq!(Priority::from(false), Priority::Low);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
