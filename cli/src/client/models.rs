//! Request and response bodies of the MythX v1 API.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as, skip_serializing_none};

//
// Authentication
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub eth_address: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub access_token: &'a str,
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponse {
    pub jwt_tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenPair {
    pub access: String,
    pub refresh: String,
}

//
// Analyses
//

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub source: String,
}

/// Source files keyed by the name they are reported under.
pub type Sources = BTreeMap<String, SourceEntry>;

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalysisSubmission<'a> {
    pub client_tool_name: &'a str,
    pub data: AnalysisData<'a>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalysisData<'a> {
    pub bytecode: Option<&'a str>,
    pub sources: Option<&'a Sources>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub uuid: String,
    pub status: String,
    pub api_version: Option<String>,
    pub mythril_version: Option<String>,
    pub maru_version: Option<String>,
    pub harvey_version: Option<String>,
    pub queue_time: Option<u64>,
    pub run_time: Option<u64>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub submitted_by: Option<String>,
    pub client_tool_name: Option<String>,
    pub error: Option<String>,
}

impl Analysis {
    /// Field name / value pairs for the status table. Absent fields are skipped.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![("uuid", self.uuid.clone()), ("status", self.status.clone())];
        let optional = [
            ("api_version", self.api_version.clone()),
            ("mythril_version", self.mythril_version.clone()),
            ("maru_version", self.maru_version.clone()),
            ("harvey_version", self.harvey_version.clone()),
            ("queue_time", self.queue_time.map(|t| t.to_string())),
            ("run_time", self.run_time.map(|t| t.to_string())),
            ("submitted_at", self.submitted_at.map(|t| t.to_rfc3339())),
            ("submitted_by", self.submitted_by.clone()),
            ("client_tool_name", self.client_tool_name.clone()),
            ("error", self.error.clone()),
        ];
        out.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );
        out
    }
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AnalysisList {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub analyses: Vec<Analysis>,
    #[serde(default)]
    pub total: u64,
}

//
// Detected issues
//

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Unknown => "Unknown",
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub head: String,
    #[serde(default)]
    pub tail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLocation {
    pub source_map: String,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "swcID", default)]
    pub swc_id: String,
    #[serde(default)]
    pub swc_title: String,
    #[serde(default)]
    pub description: Description,
    pub severity: Severity,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub locations: Vec<IssueLocation>,
}

impl Issue {
    pub fn description_short(&self) -> &str {
        &self.description.head
    }
}

/// The issues found for one submitted input, with the ordered list of source
/// files that source map file indices point into.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub source_list: Vec<String>,
    pub source_type: Option<String>,
    pub source_format: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DetectedIssues {
    pub reports: Vec<IssueReport>,
}

//
// Unauthenticated endpoints
//

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenApiMode {
    Html,
    #[default]
    Yaml,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub api: String,
    #[serde(default)]
    pub maru: String,
    #[serde(default)]
    pub mythril: String,
    #[serde(default)]
    pub harvey: String,
    #[serde(default)]
    pub hash: String,
}

impl VersionInfo {
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("Api", &self.api),
            ("Maru", &self.maru),
            ("Mythril", &self.mythril),
            ("Harvey", &self.harvey),
            ("Hash", &self.hash),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_issue_report_with_null_lists() {
        let json = r#"[{
            "issues": [{
                "swcID": "SWC-110",
                "swcTitle": "Assert Violation",
                "description": {"head": "A reachable exception has been detected.", "tail": "..."},
                "severity": "Low",
                "locations": null
            }],
            "sourceType": "raw-bytecode",
            "sourceFormat": "evm-byzantium-bytecode",
            "sourceList": null
        }]"#;
        let detected: DetectedIssues = serde_json::from_str(json).unwrap();
        let report = &detected.reports[0];
        assert!(report.source_list.is_empty());
        assert!(report.issues[0].locations.is_empty());
        assert_eq!(report.issues[0].swc_id, "SWC-110");
        assert_eq!(
            report.issues[0].description_short(),
            "A reachable exception has been detected."
        );
    }

    #[test]
    fn unrecognised_severity_maps_to_unknown() {
        let issue: Issue =
            serde_json::from_str(r#"{"swcTitle": "x", "severity": "Critical"}"#).unwrap();
        assert_eq!(issue.severity, Severity::Unknown);
    }

    #[test]
    fn submission_skips_absent_fields() {
        let body = AnalysisSubmission {
            client_tool_name: "mythx-cli",
            data: AnalysisData {
                bytecode: Some("0xfe"),
                sources: None,
            },
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"clientToolName":"mythx-cli","data":{"bytecode":"0xfe"}}"#
        );
    }

    #[test]
    fn analysis_fields_skip_missing_values() {
        let analysis: Analysis = serde_json::from_str(
            r#"{"uuid": "ab9092f7-54d0-480f-9b63-1bb1508280e2", "status": "Finished",
                "submittedAt": "2019-01-10T01:29:38.410Z", "runTime": 12}"#,
        )
        .unwrap();
        let keys: Vec<_> = analysis.fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["uuid", "status", "run_time", "submitted_at"]);
    }
}
