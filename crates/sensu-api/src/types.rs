//! Records returned by the Sensu results endpoint.
//!
//! The API emits PascalCase keys in some deployments and lowercase keys in
//! others; both spellings are accepted. Every field defaults when absent, only
//! the surrounding JSON array shape is mandatory.

use serde::{Deserialize, Serialize};

/// One reported outcome from the monitoring system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CheckResult {
    /// Name of the node or agent that executed the check.
    #[serde(alias = "client")]
    pub client: String,
    /// The check's last execution.
    #[serde(alias = "check")]
    pub check: Check,
}

/// The last execution of a single named health probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Check {
    /// Check name, unique per client.
    #[serde(alias = "name")]
    pub name: String,
    /// Execution time in seconds.
    #[serde(alias = "duration")]
    pub duration: f64,
    /// Unix timestamp of the execution.
    #[serde(alias = "executed")]
    pub executed: i64,
    /// Subscriptions the check was issued to.
    #[serde(alias = "subscribers")]
    pub subscribers: Vec<String>,
    /// Free-text diagnostic output.
    #[serde(alias = "output")]
    pub output: String,
    /// Status code: 0 ok, 1 warning, 2 critical, anything else unknown.
    #[serde(alias = "status")]
    pub status: i64,
    /// Unix timestamp of the request.
    #[serde(alias = "issued")]
    pub issued: i64,
    /// Scheduling interval in seconds.
    #[serde(alias = "interval")]
    pub interval: i64,
}

impl CheckResult {
    /// Creates a result with just the fields the exporter labels on.
    pub fn new(client: impl Into<String>, name: impl Into<String>, status: i64) -> Self {
        Self {
            client: client.into(),
            check: Check {
                name: name.into(),
                status,
                ..Check::default()
            },
        }
    }

    /// Sets the check output.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.check.output = output.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_minimal_pascal_case() {
        let body = r#"[{"Client":"node1","Check":{"Name":"disk","Status":0}}]"#;
        let results: Vec<CheckResult> = serde_json::from_str(body).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].client, "node1");
        assert_eq!(results[0].check.name, "disk");
        assert_eq!(results[0].check.status, 0);
        assert!(results[0].check.output.is_empty());
    }

    #[test]
    fn decode_lowercase_sensu_payload() {
        let body = r#"[{
            "client": "web-01",
            "check": {
                "name": "check_http",
                "command": "check-http.rb -u http://localhost",
                "subscribers": ["web"],
                "interval": 60,
                "issued": 1500000000,
                "executed": 1500000001,
                "duration": 0.153,
                "output": "CheckHttp CRITICAL: connection refused",
                "status": 2
            }
        }]"#;
        let results: Vec<CheckResult> = serde_json::from_str(body).unwrap();

        let check = &results[0].check;
        assert_eq!(results[0].client, "web-01");
        assert_eq!(check.name, "check_http");
        assert_eq!(check.subscribers, vec!["web".to_string()]);
        assert_eq!(check.interval, 60);
        assert_eq!(check.issued, 1_500_000_000);
        assert_eq!(check.executed, 1_500_000_001);
        assert!((check.duration - 0.153).abs() < f64::EPSILON);
        assert_eq!(check.status, 2);
        assert!(check.output.contains("CRITICAL"));
    }

    #[test]
    fn decode_empty_array() {
        let results: Vec<CheckResult> = serde_json::from_str("[]").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn decode_rejects_object_body() {
        let result = serde_json::from_str::<Vec<CheckResult>>(r#"{"error":"not found"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn informational_fields_survive_reencoding() {
        let mut original = CheckResult::new("node1", "load", 1).with_output("load high");
        original.check.duration = 1.5;
        original.check.subscribers = vec!["base".to_string(), "linux".to_string()];
        original.check.interval = 30;

        let encoded = serde_json::to_string(&original).unwrap();
        assert!(encoded.contains("\"Subscribers\""));
        let decoded: CheckResult = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn builder_sets_labelled_fields() {
        let result = CheckResult::new("db-1", "postgres", 2).with_output("down");
        assert_eq!(result.client, "db-1");
        assert_eq!(result.check.name, "postgres");
        assert_eq!(result.check.status, 2);
        assert_eq!(result.check.output, "down");
    }
}
