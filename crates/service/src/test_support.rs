#![cfg(test)]
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::UpstreamError;
use crate::upstream::{Endpoint, UpstreamRequest, UpstreamTransport};

type Reply = Result<Vec<u8>, UpstreamError>;

/// In-memory transport answering from a per-path script.
///
/// Replies for a path are consumed in order; the last one keeps being served.
/// Every request is recorded so tests can assert on what was (not) called.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    calls: Mutex<Vec<UpstreamRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ok(self: Arc<Self>, endpoint: Endpoint, body: &str) -> Arc<Self> {
        self.push(endpoint, Ok(body.as_bytes().to_vec()));
        self
    }

    pub fn err(self: Arc<Self>, endpoint: Endpoint, error: UpstreamError) -> Arc<Self> {
        self.push(endpoint, Err(error));
        self
    }

    fn push(&self, endpoint: Endpoint, reply: Reply) {
        self.replies
            .lock()
            .expect("replies lock")
            .entry(endpoint.path)
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<UpstreamRequest> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls().iter().filter(|c| c.endpoint == endpoint).count()
    }
}

#[async_trait]
impl UpstreamTransport for ScriptedTransport {
    async fn send(&self, request: &UpstreamRequest) -> Result<Vec<u8>, UpstreamError> {
        self.calls.lock().expect("calls lock").push(request.clone());
        let mut replies = self.replies.lock().expect("replies lock");
        let queue = replies.get_mut(request.endpoint.path);
        match queue {
            Some(q) if q.len() > 1 => q.pop_front().expect("non-empty queue"),
            Some(q) if !q.is_empty() => q[0].clone(),
            _ => Err(UpstreamError::Unreachable {
                service: request.endpoint.service,
                path: request.endpoint.path,
                reason: "no scripted reply".into(),
            }),
        }
    }
}
