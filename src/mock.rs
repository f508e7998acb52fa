use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;

use super::adapter::{
    RestBytes, RestError, RestFuture, RestRequest, RestResponse, RestResult,
    RestTransport, RestTransportState,
};

#[derive(Clone, Debug, Default)]
pub enum MockBehavior {
    #[default]
    Pass,
    ConnectError {
        reason: String,
    },
    SendError {
        reason: String,
    },
    ReceiveError {
        reason: String,
    },
    TimeoutError {
        reason: String,
    },
    InternalError {
        reason: String,
    },
}

impl MockBehavior {
    pub fn pass() -> Self {
        Self::Pass
    }

    pub fn connect_error(reason: impl Into<String>) -> Self {
        Self::ConnectError {
            reason: reason.into(),
        }
    }

    pub fn send_error(reason: impl Into<String>) -> Self {
        Self::SendError {
            reason: reason.into(),
        }
    }

    pub fn receive_error(reason: impl Into<String>) -> Self {
        Self::ReceiveError {
            reason: reason.into(),
        }
    }

    pub fn timeout_error(reason: impl Into<String>) -> Self {
        Self::TimeoutError {
            reason: reason.into(),
        }
    }

    pub fn internal_error(reason: impl Into<String>) -> Self {
        Self::InternalError {
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockBehaviorPlan {
    request: VecDeque<MockBehavior>,
}

impl MockBehaviorPlan {
    pub fn push(&mut self, behavior: MockBehavior) -> &mut Self {
        self.request.push_back(behavior);
        self
    }

    fn pop(&mut self) -> MockBehavior {
        self.request.pop_front().unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, RestBytes)>,
    pub body: RestBytes,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<RestBytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<RestBytes>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body.into())
    }

    pub fn json<T: Serialize>(status: u16, payload: &T) -> RestResult<Self> {
        let body = sonic_rs::to_vec(payload).map_err(RestError::from)?;
        Ok(Self::new(status, body).with_header("content-type", "application/json"))
    }
}

#[derive(Clone, Debug)]
pub struct MockRestStateSnapshot {
    pub state: RestTransportState,
    pub request_count: usize,
    pub last_url: Option<String>,
    pub last_status: Option<u16>,
    pub behavior_remaining: usize,
    pub route_queue_len: usize,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct MockRestAdapterState {
    state: RestTransportState,
    request_count: usize,
    last_url: Option<String>,
    last_status: Option<u16>,
    behavior_plan: MockBehaviorPlan,
    route_response_queues: HashMap<(Method, String), VecDeque<MockResponse>>,
    outbound_log: Vec<RestRequest>,
    last_error: Option<String>,
}

impl MockRestAdapterState {
    fn snapshot(&self) -> MockRestStateSnapshot {
        MockRestStateSnapshot {
            state: self.state,
            request_count: self.request_count,
            last_url: self.last_url.clone(),
            last_status: self.last_status,
            behavior_remaining: self.behavior_plan.request.len(),
            route_queue_len: self.route_response_queues.values().map(VecDeque::len).sum(),
            last_error: self.last_error.clone(),
        }
    }
}

impl Default for MockRestAdapterState {
    fn default() -> Self {
        Self {
            state: RestTransportState::Idle,
            request_count: 0,
            last_url: None,
            last_status: None,
            behavior_plan: MockBehaviorPlan::default(),
            route_response_queues: HashMap::new(),
            outbound_log: Vec::new(),
            last_error: None,
        }
    }
}

/// In-memory [`RestTransport`] that answers from per-route queues and records every
/// request it sees. Queues that run dry answer `200` with an empty body.
#[derive(Clone, Debug, Default)]
pub struct MockRestAdapter {
    state: Arc<Mutex<MockRestAdapterState>>,
}

impl MockRestAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior_plan(behavior_plan: MockBehaviorPlan) -> Self {
        let state = MockRestAdapterState {
            behavior_plan,
            ..MockRestAdapterState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    // A poisoned lock only means another test thread panicked mid-update; the
    // bookkeeping is still readable.
    fn lock(&self) -> MutexGuard<'_, MockRestAdapterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> MockRestStateSnapshot {
        self.lock().snapshot()
    }

    fn queue_response_for(&self, method: Method, url: impl Into<String>, response: MockResponse) {
        self.lock()
            .route_response_queues
            .entry((method, url.into()))
            .or_default()
            .push_back(response);
    }

    pub fn queue_post_response(&self, url: impl Into<String>, response: MockResponse) {
        self.queue_response_for(Method::POST, url, response);
    }

    /// Requests seen so far, oldest first.
    pub fn outbound_requests(&self) -> Vec<RestRequest> {
        self.lock().outbound_log.clone()
    }

    pub fn outbound_count(&self) -> usize {
        self.lock().outbound_log.len()
    }

    fn next_response(&self, request: &RestRequest) -> Option<MockResponse> {
        let route_key = (request.method.clone(), request.url.clone());
        self.lock()
            .route_response_queues
            .get_mut(&route_key)
            .and_then(VecDeque::pop_front)
    }

    fn fail(&self, error: RestError) -> RestError {
        let mut state = self.lock();
        state.state = RestTransportState::Error;
        state.last_error = Some(error.message.clone());
        state.last_status = error.status;
        error
    }

    fn complete(&self, response: RestResponse) -> RestResponse {
        let mut state = self.lock();
        state.last_status = Some(response.status);
        state.state = RestTransportState::Idle;
        response
    }
}

impl RestTransport for MockRestAdapter {
    fn execute(&self, request: RestRequest) -> RestFuture<RestResult<RestResponse>> {
        let adapter = self.clone();
        Box::pin(async move {
            let behavior = {
                let mut state = adapter.lock();
                let behavior = state.behavior_plan.pop();
                state.request_count += 1;
                state.last_url = Some(request.url.clone());
                state.state = RestTransportState::Busy;
                state.last_error = None;
                state.outbound_log.push(request.clone());
                behavior
            };

            let start = Instant::now();
            let error = match behavior {
                MockBehavior::Pass => None,
                MockBehavior::ConnectError { reason } => Some(RestError::connect(reason, None, true)),
                MockBehavior::SendError { reason } => Some(RestError::send(reason, None, false)),
                MockBehavior::ReceiveError { reason } => {
                    Some(RestError::receive(reason, None, false))
                }
                MockBehavior::TimeoutError { reason } => {
                    Some(RestError::timeout(reason, None, true))
                }
                MockBehavior::InternalError { reason } => Some(RestError::internal(reason)),
            };
            if let Some(error) = error {
                return Err(adapter.fail(error));
            }

            let response = match adapter.next_response(&request) {
                Some(response) => RestResponse {
                    status: response.status,
                    headers: response.headers,
                    body: response.body,
                    elapsed: start.elapsed(),
                },
                None => RestResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: Bytes::new(),
                    elapsed: start.elapsed(),
                },
            };
            Ok(adapter.complete(response))
        })
    }
}
