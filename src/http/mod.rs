//! HTTP protocol layer module
//!
//! Range parsing, content typing, cache headers and response building,
//! independent of how requests are routed to files.

pub mod body;
pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::MediaBody;
pub use cache::CachePolicy;
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_416_response, build_error_response, build_full_response, build_partial_response,
};
