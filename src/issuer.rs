use std::io::Write;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::adapter::{Client, RestRequest};
use crate::config::{CONTENT_TYPE_JSON, IssuerConfig};
use crate::error::Result;
use crate::submission::{Submission, SubmissionReceipt};

/// What came back from a single submission.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub status: u16,
    pub bytes_written: usize,
    pub elapsed: Duration,
    /// Decoded acknowledgement, when the body has the agent's receipt shape.
    pub receipt: Option<SubmissionReceipt>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one submission per call and copies the raw response body to a writer.
///
/// There is no retry and no interpretation of the status code: a `4xx`/`5xx` answer is
/// written out like any other.
#[derive(Clone)]
pub struct Issuer {
    client: Client,
    config: IssuerConfig,
}

impl Issuer {
    pub fn new(client: Client, config: IssuerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    pub async fn issue<W: Write>(&self, submission: &Submission, out: &mut W) -> Result<Outcome> {
        let body = submission.to_body()?;
        self.issue_body(body, out).await
    }

    /// Sends `body` verbatim. Callers are expected to have validated it.
    pub async fn issue_body<W: Write>(&self, body: impl Into<Bytes>, out: &mut W) -> Result<Outcome> {
        let request = self.build_request(body.into());
        debug!(
            url = %request.url,
            body_len = request.body.as_ref().map_or(0, Bytes::len),
            "sending submission"
        );

        let response = self.client.execute(request).await?;
        info!(
            status = response.status(),
            elapsed = ?response.elapsed,
            "submission answered"
        );
        if !response.is_success() {
            warn!(status = response.status(), "endpoint returned non-success status");
        }

        out.write_all(response.body())?;
        out.flush()?;

        let receipt = match response.json::<SubmissionReceipt>() {
            Ok(receipt) => {
                debug!(agent = %receipt.agent_address, text = %receipt.text, "receipt decoded");
                Some(receipt)
            }
            Err(err) => {
                debug!(error = %err, "response body is not a submission receipt");
                None
            }
        };

        Ok(Outcome {
            status: response.status,
            bytes_written: response.body.len(),
            elapsed: response.elapsed,
            receipt,
        })
    }

    fn build_request(&self, body: Bytes) -> RestRequest {
        let request = RestRequest::post(self.config.endpoint.as_str())
            .with_header("Content-Type", CONTENT_TYPE_JSON)
            .with_body(body);
        match self.config.timeout {
            Some(timeout) => request.with_timeout(timeout),
            None => request,
        }
    }
}
