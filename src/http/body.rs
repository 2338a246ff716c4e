//! Bounded body buffering.

use std::pin::Pin;

use axum::body::{Body, HttpBody};
use bytes::{Bytes, BytesMut};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The stream broke; `partial` holds whatever arrived first.
    #[error("body read failed: {source}")]
    Read { partial: Bytes, source: axum::Error },
}

/// Buffer a body, failing once it grows past `limit` bytes.
pub async fn read_body(mut body: Body, limit: usize) -> Result<Bytes, BodyError> {
    let mut buf = BytesMut::new();

    while let Some(frame) = std::future::poll_fn(|cx| Pin::new(&mut body).poll_frame(cx)).await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(source) => {
                return Err(BodyError::Read {
                    partial: buf.freeze(),
                    source,
                })
            }
        };

        if let Ok(data) = frame.into_data() {
            if buf.len() + data.len() > limit {
                return Err(BodyError::TooLarge { limit });
            }
            buf.extend_from_slice(&data);
        }
    }

    Ok(buf.freeze())
}
