use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use serde_json::Value;

use crate::{
    InstituteClient, InstituteClientOpts, InstituteClientOptsBuilder, InstituteError, error,
    http::client::{HttpRequest, HttpResponse, InstituteHttpClient},
};

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, InstituteError> + Send + Sync;

#[derive(Default)]
struct MockState {
    queue: VecDeque<Result<HttpResponse, InstituteError>>,
    requests: Vec<HttpRequest>,
}

/// A transport that records what it is asked to send and answers from a
/// queue, or from a routing function when one is set.
#[derive(Clone, Default)]
pub(crate) struct MockClient {
    state: Arc<Mutex<MockState>>,
    responder: Option<Arc<Responder>>,
}

impl MockClient {
    pub(crate) fn routed(
        f: impl Fn(&HttpRequest) -> Result<HttpResponse, InstituteError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Arc::default(),
            responder: Some(Arc::new(f)),
        }
    }

    pub(crate) fn push(&self, status: u16, body: Value) {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.push_raw(status, bytes);
    }

    pub(crate) fn push_raw(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .unwrap()
            .queue
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub(crate) fn push_transport_error(&self, message: &'static str) {
        self.state.lock().unwrap().queue.push_back(Err(error!(message)));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.trim_start_matches("http://mock.test").to_string())
            .collect()
    }
}

impl InstituteHttpClient for MockClient {
    fn new() -> Self {
        Self::default()
    }

    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, InstituteError>> + Send {
        let result = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());

            match &self.responder {
                Some(responder) => responder(&request),
                None => state
                    .queue
                    .pop_front()
                    .unwrap_or_else(|| Err(error!("mock transport has no queued response"))),
            }
        };

        std::future::ready(result)
    }
}

pub(crate) fn test_opts() -> InstituteClientOpts {
    InstituteClientOptsBuilder::default()
        .base_url("http://mock.test/")
        .build()
        .unwrap()
}

pub(crate) fn test_client(mock: &MockClient) -> InstituteClient<MockClient> {
    InstituteClient::with_client(mock.clone(), test_opts())
}
