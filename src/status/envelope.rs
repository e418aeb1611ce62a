use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::StatusError;
use crate::status::types::StatusReport;

pub const STATUS_REPORT_ERROR: &str = "error getting status report";
pub const VERSION_MISMATCH_ERROR: &str = "pgo client and server version mismatch";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseCode {
    #[default]
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "error")]
    Error,
}

impl ResponseCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome carried by every API response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Status {
    pub code: ResponseCode,
    pub msg: String,
}

impl Status {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::Error,
            msg: msg.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == ResponseCode::Ok
    }
}

/// Response to a status query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StatusResponse {
    pub status: Status,
    pub result: StatusReport,
}

/// Wrap a report in the response envelope.
///
/// A composer error turns into a generic `Error` status; the cause is only
/// logged here and never returned to the caller. The report is attached
/// either way.
pub fn build_envelope(report: StatusReport, err: Option<&StatusError>) -> StatusResponse {
    let status = match err {
        Some(e) => {
            error!(error = %e, "Failed to build status report");
            Status::error(STATUS_REPORT_ERROR)
        }
        None => Status::ok(),
    };

    StatusResponse {
        status,
        result: report,
    }
}

impl StatusResponse {
    pub fn from_result(result: Result<StatusReport, StatusError>) -> Self {
        match result {
            Ok(report) => build_envelope(report, None),
            Err(e) => build_envelope(StatusReport::default(), Some(&e)),
        }
    }

    pub fn version_mismatch() -> Self {
        Self {
            status: Status::error(VERSION_MISMATCH_ERROR),
            result: StatusReport::default(),
        }
    }
}
