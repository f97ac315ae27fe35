//! Transient banners shown above a list after an action completes.

use std::time::{Duration, Instant};

use owo_colors::AnsiColors;

/// How long a banner stays up unless replaced.
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_secs(3);

/// A banner notification message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub level: BannerLevel,
    /// When the banner was raised
    pub timestamp: Instant,
}

/// Severity level for banners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Info,
    Success,
    Error,
}

impl Banner {
    pub fn new(message: impl Into<String>, level: BannerLevel) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, BannerLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, BannerLevel::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, BannerLevel::Error)
    }

    pub fn is_error(&self) -> bool {
        self.level == BannerLevel::Error
    }

    /// Terminal color for this banner's level
    pub fn color(&self) -> AnsiColors {
        match self.level {
            BannerLevel::Info => AnsiColors::Cyan,
            BannerLevel::Success => AnsiColors::Green,
            BannerLevel::Error => AnsiColors::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_levels() {
        assert!(Banner::error("in use").is_error());
        assert!(!Banner::success("Role deleted successfully").is_error());
        assert_eq!(Banner::success("ok").color(), AnsiColors::Green);
        assert_eq!(Banner::error("no").color(), AnsiColors::Red);
    }
}
