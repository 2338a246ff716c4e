//! CONNECT tunnelling.
//!
//! Tunnelled bytes are never inspected, so these flows produce no hook calls.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

/// Answer a CONNECT request and splice the upgraded connection to the target.
pub async fn tunnel(request: Request<Body>) -> Response {
    let Some(authority) = request.uri().authority().map(|a| a.to_string()) else {
        tracing::warn!(uri = %request.uri(), "CONNECT without authority");
        return (StatusCode::BAD_REQUEST, "CONNECT target must be host:port").into_response();
    };

    let mut upstream = match TcpStream::connect(&authority).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(target = %authority, error = %e, "Tunnel connect failed");
            return (StatusCode::BAD_GATEWAY, "Upstream connect failed").into_response();
        }
    };

    tokio::spawn(async move {
        match hyper::upgrade::on(request).await {
            Ok(upgraded) => {
                let mut client = TokioIo::new(upgraded);
                match tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
                    Ok((sent, received)) => {
                        tracing::debug!(target = %authority, sent, received, "Tunnel closed");
                    }
                    Err(e) => tracing::debug!(target = %authority, error = %e, "Tunnel aborted"),
                }
            }
            Err(e) => tracing::warn!(target = %authority, error = %e, "Connection upgrade failed"),
        }
    });

    StatusCode::OK.into_response()
}
