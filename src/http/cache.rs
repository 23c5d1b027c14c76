//! HTTP cache control module
//!
//! Media files are immutable once published, so every successful response
//! is marked publicly cacheable with a long `max-age` and a matching `Expires`.

use chrono::{DateTime, TimeDelta, Utc};

/// One year, in seconds
pub const ONE_YEAR: u32 = 31_536_000;

/// Public cache policy with a fixed lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    max_age: u32,
}

impl CachePolicy {
    pub const fn public(max_age: u32) -> Self {
        Self { max_age }
    }

    pub const fn max_age(self) -> u32 {
        self.max_age
    }

    /// `Cache-Control` header value
    pub fn cache_control(self) -> String {
        format!("public, max-age={}", self.max_age)
    }

    /// `Expires` header value, `max_age` seconds after `now`
    pub fn expires(self, now: DateTime<Utc>) -> String {
        http_date(now + TimeDelta::seconds(i64::from(self.max_age)))
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::public(ONE_YEAR)
    }
}

/// Format a timestamp as an RFC 1123 HTTP date
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
