//! Submission payload sent to the intake endpoint, and the acknowledgement the
//! receiving agent answers with.

use serde::{Deserialize, Serialize};

use crate::config::check_http_url;
use crate::error::{Error, Result};

const CANONICAL_REPO_URL: &str = "https://github.com/ishAN-121/APDP-Implementation";

const CANONICAL_PARTICIPANT_SUMMARY: &str = "We used the topsis for immediate SMS alerts and \
Firebase to manage user profiles. The logic employs a custom graph database for decision making.";

const CANONICAL_SPONSOR_REQUIREMENTS: &str = "This challenge requires integration of two key \
external components:1. The project must use the Topsis SMS API for user notification.2. The \
project must use PDP user data using the firebase module/SDK.3. Bonus points for using the MeTTa \
knowledge graph for complex reasoning.";

/// A repository submission. Field order is the wire order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Submission {
    pub repo_url: String,
    pub participant_summary: String,
    pub sponsor_requirements: String,
}

impl Submission {
    pub fn new(
        repo_url: impl Into<String>,
        participant_summary: impl Into<String>,
        sponsor_requirements: impl Into<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            participant_summary: participant_summary.into(),
            sponsor_requirements: sponsor_requirements.into(),
        }
    }

    /// The fixed submission the `submit` binary sends when no payload is given.
    pub fn canonical() -> Self {
        Self::new(
            CANONICAL_REPO_URL,
            CANONICAL_PARTICIPANT_SUMMARY,
            CANONICAL_SPONSOR_REQUIREMENTS,
        )
    }

    /// Decodes and validates a submission supplied as JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let submission: Self = serde_json::from_slice(bytes)?;
        submission.validate()?;
        Ok(submission)
    }

    pub fn validate(&self) -> Result<()> {
        check_http_url(&self.repo_url)
            .map_err(|reason| Error::payload(format!("repo_url {:?}: {reason}", self.repo_url)))?;
        Ok(())
    }

    /// Two-space indented JSON, no trailing newline.
    pub fn to_body(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Acknowledgement returned by the verification agent's REST handler.
#[derive(Clone, Debug, Deserialize)]
pub struct SubmissionReceipt {
    pub text: String,
    pub agent_address: String,
    pub timestamp: i64,
    #[serde(default)]
    pub response_from_agent: Option<sonic_rs::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL_BODY: &str = r#"{
  "repo_url": "https://github.com/ishAN-121/APDP-Implementation",
  "participant_summary": "We used the topsis for immediate SMS alerts and Firebase to manage user profiles. The logic employs a custom graph database for decision making.",
  "sponsor_requirements": "This challenge requires integration of two key external components:1. The project must use the Topsis SMS API for user notification.2. The project must use PDP user data using the firebase module/SDK.3. Bonus points for using the MeTTa knowledge graph for complex reasoning."
}"#;

    #[test]
    fn canonical_body_matches_wire_literal() {
        let body = Submission::canonical().to_body().expect("encode");
        assert_eq!(std::str::from_utf8(&body).expect("utf-8"), CANONICAL_BODY);
    }

    #[test]
    fn canonical_literal_decodes_to_canonical_submission() {
        let decoded = Submission::from_json(CANONICAL_BODY.as_bytes()).expect("decode");
        assert_eq!(decoded, Submission::canonical());
    }

    #[test]
    fn missing_field_is_a_payload_error() {
        let err = Submission::from_json(br#"{"repo_url":"https://example.com/r"}"#)
            .expect_err("incomplete payload");
        assert!(matches!(err, Error::Payload(_)));
        assert!(err.to_string().contains("participant_summary"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Submission::from_json(
            br#"{"repo_url":"https://example.com/r","participant_summary":"s","sponsor_requirements":"r","action":"verify_project_integrity"}"#,
        )
        .expect_err("extra key must not reach the wire");
        assert!(matches!(err, Error::Payload(_)));
        assert!(err.to_string().contains("unknown field `action`"), "{err}");
    }

    #[test]
    fn repo_url_must_be_http() {
        let err = Submission::from_json(
            br#"{"repo_url":"git@github.com:a/b.git","participant_summary":"","sponsor_requirements":""}"#,
        )
        .expect_err("ssh remote is not accepted");
        assert!(err.to_string().contains("repo_url"));
    }

    #[test]
    fn non_ascii_text_is_emitted_as_utf8() {
        let body = Submission::new("https://example.com/r", "café ✓", "")
            .to_body()
            .expect("encode");
        let text = String::from_utf8(body).expect("utf-8");
        assert!(text.contains("\"participant_summary\": \"café ✓\""));
    }

    #[test]
    fn receipt_tolerates_missing_agent_reply() {
        let receipt: SubmissionReceipt = sonic_rs::from_slice(
            br#"{"text":"Received","agent_address":"agent1q","timestamp":1700000000}"#,
        )
        .expect("decode receipt");
        assert_eq!(receipt.agent_address, "agent1q");
        assert!(receipt.response_from_agent.is_none());
    }
}
