//! Client for the submission intake endpoint: encodes a repository submission,
//! POSTs it once over a reqwest-backed transport and hands back the raw response.
//! An in-memory mock transport keeps the issuer fully testable offline.

pub mod adapter;
pub mod config;
pub mod error;
pub mod issuer;
pub mod mock;
pub mod submission;

pub use reqwest::Method;

pub use adapter::{
    Client, ReqwestTransport, RestBytes, RestError, RestErrorKind, RestFuture, RestRequest,
    RestResponse, RestResult, RestTransport, RestTransportState,
};
pub use config::{CONTENT_TYPE_JSON, DEFAULT_ENDPOINT, IssuerConfig};
pub use error::{Error, Result};
pub use issuer::{Issuer, Outcome};
pub use mock::{MockBehavior, MockBehaviorPlan, MockResponse, MockRestAdapter, MockRestStateSnapshot};
pub use submission::{Submission, SubmissionReceipt};
