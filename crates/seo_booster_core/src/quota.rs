//! crates/seo_booster_core/src/quota.rs
//!
//! Free-tier quota arithmetic. Pure functions of the tier flag, the request
//! counter and the configured limit.

/// How many more requests a user may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Unlimited,
    Remaining(u32),
}

impl Quota {
    pub fn is_unlimited(self) -> bool {
        matches!(self, Quota::Unlimited)
    }
}

/// Remaining allowance, clamped at zero for users already past the limit.
pub fn quota_remaining(is_premium: bool, request_count: u32, limit: u32) -> Quota {
    if is_premium {
        Quota::Unlimited
    } else {
        Quota::Remaining(limit.saturating_sub(request_count))
    }
}

pub fn quota_exhausted(is_premium: bool, request_count: u32, limit: u32) -> bool {
    !is_premium && request_count >= limit
}
