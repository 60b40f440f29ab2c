//! Buffered read of a direct upload body

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::fmt::Display;

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The body ended abnormally, typically a client disconnect mid-transfer.
    #[error("Failed to read file data: {0}")]
    Interrupted(String),

    #[error("File size exceeds maximum allowed size of {} MB", .max / 1024 / 1024)]
    TooLarge { max: usize },
}

/// Drain an upload body into memory, failing once `max_size` bytes are exceeded.
pub async fn read_upload<S, E>(stream: S, max_size: usize) -> Result<Bytes, ReadError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut body = BytesMut::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::warn!(error = %e, received_bytes = body.len(), "Upload body interrupted");
            ReadError::Interrupted(e.to_string())
        })?;

        if body.len() + chunk.len() > max_size {
            return Err(ReadError::TooLarge { max: max_size });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}
