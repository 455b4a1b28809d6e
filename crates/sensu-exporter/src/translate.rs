//! Translation of Sensu check results into gauge samples.
//!
//! Sensu reports `0` for a healthy check while Prometheus convention is `1`
//! for up, so the gauge value is inverted: status `0` becomes `1.0` and every
//! other status becomes `0.0`. The finer-grained state is carried by the
//! optional `check_severity` label.

use std::fmt;

use sensu_api::CheckResult;

/// Label name for the reporting client.
pub const LABEL_CLIENT: &str = "client";
/// Label name for the check.
pub const LABEL_CHECK_NAME: &str = "check_name";
/// Label name for the check output.
pub const LABEL_CHECK_MESSAGE: &str = "check_message";
/// Label name for the severity.
pub const LABEL_CHECK_SEVERITY: &str = "check_severity";

/// Semantic state of a Sensu status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Status 0.
    Ok,
    /// Status 1.
    Warning,
    /// Status 2.
    Critical,
    /// Any other status, negative codes included.
    Unknown,
}

impl Severity {
    /// Map a Sensu status code onto a severity.
    #[must_use]
    pub const fn from_status(status: i64) -> Self {
        match status {
            0 => Self::Ok,
            1 => Self::Warning,
            2 => Self::Critical,
            _ => Self::Unknown,
        }
    }

    /// Label value for this severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gauge value for a Sensu status code.
#[must_use]
pub fn status_value(status: i64) -> f64 {
    if status == 0 { 1.0 } else { 0.0 }
}

/// Label set of a single check sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckLabels {
    /// Reporting client.
    pub client: String,
    /// Check name.
    pub check_name: String,
    /// Check output, only set in severity mode.
    pub check_message: Option<String>,
    /// Severity, only set in severity mode.
    pub check_severity: Option<Severity>,
}

impl CheckLabels {
    /// Label pairs in descriptor order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            (LABEL_CLIENT.to_string(), self.client.clone()),
            (LABEL_CHECK_NAME.to_string(), self.check_name.clone()),
        ];
        if let Some(message) = &self.check_message {
            pairs.push((LABEL_CHECK_MESSAGE.to_string(), message.clone()));
        }
        if let Some(severity) = self.check_severity {
            pairs.push((LABEL_CHECK_SEVERITY.to_string(), severity.as_str().to_string()));
        }
        pairs
    }
}

/// One gauge sample derived from one check result.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSample {
    /// 1.0 for a passing check, 0.0 otherwise.
    pub value: f64,
    /// Sample labels.
    pub labels: CheckLabels,
}

/// Translate a check result into a sample.
///
/// With `severity_labels` set, the output and severity are attached as
/// `check_message` and `check_severity`.
#[must_use]
pub fn translate(result: &CheckResult, severity_labels: bool) -> CheckSample {
    let status = result.check.status;
    let (check_message, check_severity) = if severity_labels {
        (
            Some(result.check.output.clone()),
            Some(Severity::from_status(status)),
        )
    } else {
        (None, None)
    };

    CheckSample {
        value: status_value(status),
        labels: CheckLabels {
            client: result.client.clone(),
            check_name: result.check.name.clone(),
            check_message,
            check_severity,
        },
    }
}
