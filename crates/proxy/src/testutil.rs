//! Test support: a scriptable network standing in for `HttpFetcher`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use overcast_client::fetch::canonicalize;
use overcast_client::{FetchResponse, Fetcher, ResourceRequest};
use overcast_core::Error;

enum Scripted {
    Respond {
        status: u16,
        content_type: String,
        body: Vec<u8>,
    },
    Fail,
}

/// A fetcher whose responses are scripted per URL. Unscripted URLs fail as
/// unreachable, and every call is counted so tests can assert the network
/// was (or was not) touched.
#[derive(Default)]
pub struct MockFetcher {
    scripted: Mutex<HashMap<String, Scripted>>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, content_type: &str, body: &[u8]) {
        let url = canonicalize(url).unwrap();
        self.scripted.lock().unwrap().insert(
            url.to_string(),
            Scripted::Respond {
                status,
                content_type: content_type.to_string(),
                body: body.to_vec(),
            },
        );
    }

    pub fn fail(&self, url: &str) {
        let url = canonicalize(url).unwrap();
        self.scripted.lock().unwrap().insert(url.to_string(), Scripted::Fail);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &ResourceRequest) -> Result<FetchResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.scripted.lock().unwrap();
        match scripted.get(request.url.as_str()) {
            Some(Scripted::Respond { status, content_type, body }) => Ok(FetchResponse {
                url: request.url.clone(),
                final_url: request.url.clone(),
                status: *status,
                content_type: Some(content_type.clone()),
                bytes: Bytes::from(body.clone()),
                headers: vec![("content-type".to_string(), content_type.clone())],
            }),
            Some(Scripted::Fail) | None => {
                Err(Error::Unreachable(format!("{}: connection refused", request.url)))
            }
        }
    }
}
