//! Media content sending module
//!
//! Opens a resolved file and answers with either the whole file or the
//! single byte range the client asked for.

use crate::error::MediaError;
use crate::handler::resolver::ResolvedFile;
use crate::http::{self, body, mime, CachePolicy, MediaBody, RangeParseResult};
use hyper::Response;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::AsyncSeekExt;

/// Send a resolved file, honouring an optional `Range` header
pub async fn send_file(
    file_ref: &ResolvedFile,
    range_header: Option<&str>,
    cache: CachePolicy,
) -> Result<Response<MediaBody>, MediaError> {
    let mut file = File::open(file_ref.path()).await?;
    let file_size = file.metadata().await?.len();
    let content_type = mime::content_type_for(file_ref.path());

    match http::parse_range_header(range_header, file_size) {
        RangeParseResult::Valid(range) => {
            file.seek(SeekFrom::Start(range.start)).await?;
            Ok(http::build_partial_response(
                body::file_span(file, range.len()),
                content_type,
                cache,
                range,
                file_size,
            ))
        }
        RangeParseResult::NotSatisfiable => {
            Ok(http::build_416_response(content_type, cache, file_size))
        }
        RangeParseResult::None => Ok(http::build_full_response(
            body::file_span(file, file_size),
            content_type,
            cache,
            file_size,
        )),
    }
}
