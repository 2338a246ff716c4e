//! Log record data model and its JSON wire contract.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    #[default]
    Info,
    Error,
    Critical,
}

impl LogType {
    /// Severity for a response status code.
    pub fn for_status(status: u16) -> Self {
        match status {
            500..=u16::MAX => LogType::Critical,
            400..=499 => LogType::Error,
            _ => LogType::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Info => "info",
            LogType::Error => "error",
            LogType::Critical => "critical",
        }
    }
}

/// One structured record per logged flow.
///
/// Response fields stay `None` until the response is observed and are omitted
/// from the JSON while absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,
    pub correlation_id: String,
    pub client_name: String,
    pub user: String,
    pub occured_time: DateTime<Utc>,
    pub http_method: String,
    pub http_url: String,
    pub http_headers: HashMap<String, String>,
    pub http_body: String,
    pub log_text_short: String,
    pub log_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_return_code: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_response_body: Option<String>,

    /// Elapsed milliseconds between request observation and response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<i64>,

    pub log_type: LogType,
}
