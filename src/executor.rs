use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::types::{RequestDescriptor, RequestDraft, TestFailure, TestPayload, TestResponse};

/// Performs the live HTTP call for a prepared test payload.
///
/// Implementations report every failure through the returned future; they
/// must not panic in place of an `Err`.
pub trait RequestExecutor {
    fn test(
        &self,
        scope_id: i64,
        connection_id: i64,
        payload: TestPayload,
    ) -> LocalBoxFuture<'static, Result<TestResponse, TestFailure>>;
}

/// Fetches a previously saved request descriptor by reference.
pub trait RequestLoader {
    fn fetch(
        &self,
        scope_id: i64,
        request_ref: i64,
    ) -> LocalBoxFuture<'static, anyhow::Result<RequestDescriptor>>;
}

pub type ChangeFn = Box<dyn FnMut(&RequestDraft)>;
pub type CompleteFn = Box<dyn FnMut(&Value)>;

/// Callbacks the host wires into the configurator.
///
/// `on_change` fires after every meaningful draft change; `on_complete`
/// fires once per successful test run with the raw response body.
#[derive(Default)]
pub struct Callbacks {
    pub on_change: Option<ChangeFn>,
    pub on_complete: Option<CompleteFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change(mut self, f: impl FnMut(&RequestDraft) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}
