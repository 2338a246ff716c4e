//! Assembles log records at the two points of a flow's life.
//!
//! # Responsibilities
//! - Build the request-time record (identity headers, redacted headers, body)
//! - Finalize it once the response is seen (status, body, timing, severity)
//!
//! # Design Decisions
//! - Identity headers: `client-name`, `correlation-id`, `username` then `user`;
//!   empty values count as absent, others are logged verbatim
//! - Severity and both summaries are recomputed on finalize, never appended
//! - Bodies are logged as lossy UTF-8 text

use axum::http::HeaderMap;
use chrono::Utc;

use crate::flow::context::{FlowId, FlowRequest, FlowResponse};
use crate::record::model::{LogRecord, LogType};
use crate::security::redaction::HeaderRedactor;

/// Placeholder for a missing client name or user.
pub const ANONYMOUS: &str = "Anonymous";

/// Builds and finalizes [`LogRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct LogRecordBuilder {
    redactor: HeaderRedactor,
}

impl LogRecordBuilder {
    pub fn new(redactor: HeaderRedactor) -> Self {
        Self { redactor }
    }

    /// Build the initial record for a newly observed request.
    pub fn build_on_request(&self, flow_id: FlowId, request: &FlowRequest) -> LogRecord {
        let id = flow_id.to_string();
        let headers = &request.headers;

        let client_name = header_value(headers, "client-name").unwrap_or(ANONYMOUS);
        let correlation_id = header_value(headers, "correlation-id").unwrap_or(id.as_str());
        let user = header_value(headers, "username")
            .or_else(|| header_value(headers, "user"))
            .unwrap_or(ANONYMOUS);

        let method = request.method.as_str();
        LogRecord {
            correlation_id: correlation_id.to_string(),
            client_name: client_name.to_string(),
            user: user.to_string(),
            occured_time: Utc::now(),
            http_method: method.to_string(),
            http_url: request.url.clone(),
            http_headers: self.redactor.redact(headers),
            http_body: String::from_utf8_lossy(&request.body).into_owned(),
            log_text_short: "Request intercepted".to_string(),
            log_text: format!("Request intercepted: {} {}", method, request.url),
            http_return_code: None,
            http_response_body: None,
            execution_time: None,
            log_type: LogType::Info,
            id,
        }
    }
}

/// Fill in the response fields and recompute severity and summaries.
pub fn finalize_on_response(record: &mut LogRecord, response: &FlowResponse, elapsed_millis: i64) {
    let status = response.status.as_u16();

    record.http_return_code = Some(status);
    record.http_response_body = Some(String::from_utf8_lossy(&response.body).into_owned());
    record.execution_time = Some(elapsed_millis.max(0));
    record.log_type = LogType::for_status(status);

    if status >= 400 {
        record.log_text_short = format!("Error: {}", status);
        record.log_text = format!(
            "Request failed with status {}: {} {}",
            status, record.http_method, record.http_url
        );
    } else {
        record.log_text_short = format!("Success: {}", status);
        record.log_text = format!(
            "Request completed with status {}: {} {}",
            status, record.http_method, record.http_url
        );
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::redaction::MASK;
    use axum::http::{HeaderValue, Method, StatusCode};
    use bytes::Bytes;

    fn builder() -> LogRecordBuilder {
        LogRecordBuilder::new(HeaderRedactor::new(["authorization"]))
    }

    fn request(method: Method, url: &str, headers: &[(&'static str, &'static str)], body: &'static str) -> FlowRequest {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.append(*k, HeaderValue::from_static(*v));
        }
        FlowRequest {
            method,
            url: url.to_string(),
            headers: map,
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    fn response(status: u16, body: &'static str) -> FlowResponse {
        FlowResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn test_extracts_identity_headers() {
        let req = request(
            Method::POST,
            "http://test.com/api/resource",
            &[
                ("content-type", "application/json"),
                ("client-name", "ServiceA"),
                ("correlation-id", "abcd-1234"),
                ("username", "jdoe"),
                ("user", "ignored"),
                ("authorization", "Bearer secret"),
            ],
            r#"{"key":"value"}"#,
        );

        let record = builder().build_on_request(FlowId::new(), &req);

        assert_eq!(record.client_name, "ServiceA");
        assert_eq!(record.correlation_id, "abcd-1234");
        assert_eq!(record.user, "jdoe");
        assert_eq!(record.http_method, "POST");
        assert_eq!(record.http_url, "http://test.com/api/resource");
        assert_eq!(record.http_headers["content-type"], "application/json");
        assert_eq!(record.http_headers["authorization"], MASK);
        assert_eq!(record.http_body, r#"{"key":"value"}"#);
        assert_eq!(record.log_type, LogType::Info);
        assert_eq!(record.log_text_short, "Request intercepted");
        assert_eq!(record.log_text, "Request intercepted: POST http://test.com/api/resource");
        assert!(record.http_return_code.is_none());
    }

    #[test]
    fn test_defaults_without_identity_headers() {
        let flow_id = FlowId::new();
        let req = request(Method::GET, "http://test.com", &[], "");

        let record = builder().build_on_request(flow_id, &req);

        assert_eq!(record.client_name, ANONYMOUS);
        assert_eq!(record.user, ANONYMOUS);
        assert_eq!(record.id, flow_id.to_string());
        assert_eq!(record.correlation_id, record.id);
    }

    #[test]
    fn test_user_header_fallback() {
        let req = request(Method::GET, "http://example.com", &[("user", "jdoe")], "");
        let record = builder().build_on_request(FlowId::new(), &req);
        assert_eq!(record.user, "jdoe");
    }

    #[test]
    fn test_empty_username_falls_through() {
        let req = request(Method::GET, "http://example.com", &[("username", ""), ("user", "jdoe")], "");
        let record = builder().build_on_request(FlowId::new(), &req);
        assert_eq!(record.user, "jdoe");
    }

    #[test]
    fn test_identity_values_not_normalized() {
        let req = request(Method::GET, "http://example.com", &[("correlation-id", " abc ")], "");
        let record = builder().build_on_request(FlowId::new(), &req);
        assert_eq!(record.correlation_id, " abc ");
    }

    #[test]
    fn test_body_still_available_after_build() {
        let req = request(Method::PUT, "http://example.com/items/1", &[], "payload");
        let _ = builder().build_on_request(FlowId::new(), &req);
        assert_eq!(&req.body[..], b"payload");
    }

    #[test]
    fn test_finalize_not_found() {
        let req = request(Method::GET, "http://example.com/missing", &[], "");
        let mut record = builder().build_on_request(FlowId::new(), &req);

        finalize_on_response(&mut record, &response(404, "nope"), 17);

        assert_eq!(record.log_type, LogType::Error);
        assert!(record.log_text_short.contains("404"));
        assert!(record.log_text.contains("404"));
        assert!(record.log_text.contains("GET http://example.com/missing"));
        assert_eq!(record.http_return_code, Some(404));
        assert_eq!(record.http_response_body.as_deref(), Some("nope"));
        assert_eq!(record.execution_time, Some(17));
    }

    #[test]
    fn test_finalize_server_error_is_critical() {
        let req = request(Method::POST, "http://example.com/jobs", &[], "");
        let mut record = builder().build_on_request(FlowId::new(), &req);

        finalize_on_response(&mut record, &response(503, ""), 5);

        assert_eq!(record.log_type, LogType::Critical);
        assert_eq!(record.log_text_short, "Error: 503");
    }

    #[test]
    fn test_finalize_success_recomputes_summary() {
        let req = request(Method::GET, "http://example.com/", &[], "");
        let mut record = builder().build_on_request(FlowId::new(), &req);

        finalize_on_response(&mut record, &response(200, "ok"), 3);

        assert_eq!(record.log_type, LogType::Info);
        assert_eq!(record.log_text_short, "Success: 200");
        assert_eq!(record.log_text, "Request completed with status 200: GET http://example.com/");
    }

    #[test]
    fn test_finalize_clamps_negative_elapsed() {
        let req = request(Method::GET, "http://example.com/", &[], "");
        let mut record = builder().build_on_request(FlowId::new(), &req);

        finalize_on_response(&mut record, &response(204, ""), -4);
        assert_eq!(record.execution_time, Some(0));
    }
}
