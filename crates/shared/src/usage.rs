//! Session usage counters and the fixed daily limits that gate them.
//!
//! A submission carrying an image draws on the image allowance; a text-only
//! submission draws on the text allowance. `record_send` therefore bumps
//! exactly the counter whose quota the controller checked, so neither counter
//! can run past its limit between resets.

use serde::{Deserialize, Serialize};

/// Fixed per-session ceilings. Read-only after construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UsageLimits {
    pub max_text: u32,
    pub max_images: u32,
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self {
            max_text: 5,
            max_images: 3,
        }
    }
}

/// How many requests this session has spent so far.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub text_count: u32,
    pub image_count: u32,
}

impl UsageStats {
    pub fn can_send_text(&self, limits: &UsageLimits) -> bool {
        self.text_count < limits.max_text
    }

    pub fn can_send_image(&self, limits: &UsageLimits) -> bool {
        self.image_count < limits.max_images
    }

    pub fn record_send(&mut self, has_image: bool) {
        if has_image {
            self.image_count += 1;
        } else {
            self.text_count += 1;
        }
    }

    /// Demo action: both counters back to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_gate_at_boundary() {
        let limits = UsageLimits {
            max_text: 2,
            max_images: 1,
        };
        let mut usage = UsageStats::default();
        assert!(usage.can_send_text(&limits));

        usage.record_send(false);
        assert!(usage.can_send_text(&limits));
        usage.record_send(false);
        assert!(!usage.can_send_text(&limits));

        assert!(usage.can_send_image(&limits));
        usage.record_send(true);
        assert!(!usage.can_send_image(&limits));
    }

    #[test]
    fn test_image_send_leaves_text_count_alone() {
        let mut usage = UsageStats::default();
        usage.record_send(true);
        assert_eq!(usage.image_count, 1);
        assert_eq!(usage.text_count, 0);
    }

    #[test]
    fn test_text_send_leaves_image_count_alone() {
        let mut usage = UsageStats::default();
        usage.record_send(false);
        assert_eq!(usage.text_count, 1);
        assert_eq!(usage.image_count, 0);
    }

    #[test]
    fn test_reset_zeroes_both_counters() {
        let mut usage = UsageStats::default();
        for _ in 0..7 {
            usage.record_send(false);
        }
        usage.record_send(true);
        usage.reset();
        assert_eq!(usage.text_count, 0);
        assert_eq!(usage.image_count, 0);
    }

    #[test]
    fn test_counters_never_exceed_limits_when_checked() {
        // Simulates the controller loop: only send when the relevant quota
        // still has room.
        let limits = UsageLimits::default();
        let mut usage = UsageStats::default();
        for i in 0..20 {
            let has_image = i % 3 == 0;
            let allowed = if has_image {
                usage.can_send_image(&limits)
            } else {
                usage.can_send_text(&limits)
            };
            if allowed {
                usage.record_send(has_image);
            }
            assert!(usage.text_count <= limits.max_text);
            assert!(usage.image_count <= limits.max_images);
        }
    }
}
