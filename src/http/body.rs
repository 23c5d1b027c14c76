//! Response body helpers
//!
//! File content is streamed in bounded chunks so a response never holds more
//! than one chunk of the file in memory.

use futures::stream;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use std::io;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Body type of every response produced by the server
pub type MediaBody = BoxBody<Bytes, io::Error>;

/// Upper bound on a single file read
pub const CHUNK_SIZE: usize = 8192;

pub fn empty() -> MediaBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}

pub fn text(content: impl Into<Bytes>) -> MediaBody {
    Full::new(content.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Stream at most `len` bytes from the current position of `file`
///
/// Stops early at end of file. The handle is closed when the stream finishes
/// or the body is dropped (e.g. the client disconnects).
pub fn file_span(file: File, len: u64) -> MediaBody {
    let chunks = stream::try_unfold((file, len), |(mut file, remaining)| async move {
        if remaining == 0 {
            return Ok::<_, io::Error>(None);
        }

        let mut buf = vec![0; chunk_len(remaining)];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);

        Ok(Some((Frame::data(Bytes::from(buf)), (file, remaining - n as u64))))
    });

    StreamBody::new(chunks).boxed()
}

fn chunk_len(remaining: u64) -> usize {
    usize::try_from(remaining).map_or(CHUNK_SIZE, |r| r.min(CHUNK_SIZE))
}
