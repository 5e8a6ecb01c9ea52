use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::executor::{Callbacks, ChangeFn, CompleteFn, RequestExecutor, RequestLoader};
use crate::types::{
    HeaderEntry, HeaderId, HttpMethod, PaginationSettings, RequestDescriptor, RequestDraft,
    ResponseStatus, TestFailure, TestPayload, TestResponse, ViewTab,
};

/// Construction parameters for [`RequestConfigurator`].
pub struct ConfiguratorOptions {
    pub scope_id: i64,
    pub connection_id: i64,
    /// Reference to a saved request; values <= 0 mean "new request".
    pub request_ref: i64,
    /// Seed the draft directly instead of fetching by `request_ref`.
    pub descriptor: Option<RequestDescriptor>,
    pub pagination: PaginationSettings,
}

impl ConfiguratorOptions {
    pub fn new(scope_id: i64, connection_id: i64) -> Self {
        Self {
            scope_id,
            connection_id,
            request_ref: -1,
            descriptor: None,
            pagination: PaginationSettings::default(),
        }
    }
}

struct State {
    scope_id: i64,
    connection_id: i64,
    request_ref: i64,
    initial_descriptor: Option<RequestDescriptor>,
    initialized: bool,

    draft: RequestDraft,
    pagination: PaginationSettings,
    active_tab: ViewTab,

    loading: bool,
    success: Option<ResponseStatus>,
    error: Option<TestFailure>,
    result: Option<String>,

    // Last draft reported through `on_change`; gates redundant notifications
    last_notified: Option<RequestDraft>,

    executor: Rc<dyn RequestExecutor>,
    loader: Rc<dyn RequestLoader>,
    callbacks: Callbacks,
}

/// Owns the editable request draft, the header rows, the detail-tab state
/// machine, and the test-execution cycle. Cloning yields another handle to
/// the same component; the component is torn down when the last handle drops.
#[derive(Clone)]
pub struct RequestConfigurator {
    state: Rc<RefCell<State>>,
}

impl RequestConfigurator {
    pub fn new(
        options: ConfiguratorOptions,
        executor: Rc<dyn RequestExecutor>,
        loader: Rc<dyn RequestLoader>,
        callbacks: Callbacks,
    ) -> Self {
        let state = State {
            scope_id: options.scope_id,
            connection_id: options.connection_id,
            request_ref: options.request_ref,
            initial_descriptor: options.descriptor,
            initialized: false,
            draft: RequestDraft::default(),
            pagination: options.pagination,
            active_tab: ViewTab::default(),
            loading: false,
            success: None,
            error: None,
            result: None,
            last_notified: None,
            executor,
            loader,
            callbacks,
        };

        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// One-time initialization. Seeds the draft from the supplied descriptor,
    /// or fetches a saved request when a valid reference was given. A fetch
    /// failure leaves the draft at its defaults and surfaces nothing.
    pub fn initialize(&self) -> LocalBoxFuture<'static, ()> {
        {
            let mut state = self.state.borrow_mut();
            if state.initialized {
                return futures::future::ready(()).boxed_local();
            }
            state.initialized = true;

            if let Some(descriptor) = state.initial_descriptor.take() {
                // The host already knows this request, so no notification
                let draft = RequestDraft::from_descriptor(&descriptor);
                state.last_notified = Some(draft.clone());
                state.draft = draft;
                return futures::future::ready(()).boxed_local();
            }

            if state.request_ref <= 0 {
                return futures::future::ready(()).boxed_local();
            }
        }

        let (loader, scope_id, request_ref) = {
            let state = self.state.borrow();
            (state.loader.clone(), state.scope_id, state.request_ref)
        };
        let weak = Rc::downgrade(&self.state);

        async move {
            match loader.fetch(scope_id, request_ref).await {
                Ok(descriptor) => {
                    if let Some(state) = weak.upgrade() {
                        let this = RequestConfigurator { state };
                        this.replace_draft(RequestDraft::from_descriptor(&descriptor));
                    }
                }
                Err(err) => {
                    log::warn!("could not load saved request {request_ref}: {err:#}");
                }
            }
        }
        .boxed_local()
    }

    /// Change the HTTP method. Switching to a bodyless method returns the
    /// detail view to Headers, whatever tab was active; the body text itself
    /// is kept.
    pub fn set_method(&self, method: HttpMethod) {
        if !method.allows_body() {
            self.state.borrow_mut().active_tab = ViewTab::Headers;
        }

        let mut draft = self.draft();
        draft.method = method;
        self.replace_draft(draft);
    }

    /// Store the route, prefixing a `/` when the input lacks one.
    pub fn set_route(&self, route: &str) {
        let route = if route.starts_with('/') {
            route.to_string()
        } else {
            format!("/{route}")
        };

        let mut draft = self.draft();
        draft.route = route;
        self.replace_draft(draft);
    }

    pub fn toggle_global_headers(&self) {
        let mut draft = self.draft();
        draft.use_global_headers = !draft.use_global_headers;
        self.replace_draft(draft);
    }

    /// Store raw body text. Not validated here; the executor decides what to
    /// do with malformed JSON.
    pub fn set_body(&self, text: impl Into<String>) {
        let mut draft = self.draft();
        draft.body = Some(text.into());
        self.replace_draft(draft);
    }

    /// Append a blank header row and return its id.
    pub fn add_header(&self) -> HeaderId {
        let mut draft = self.draft();
        let entry = HeaderEntry::blank();
        let id = entry.id;
        draft.headers.push(entry);
        self.replace_draft(draft);
        id
    }

    /// Remove the header row with the given id; unknown ids are a no-op.
    pub fn remove_header(&self, id: HeaderId) {
        let mut draft = self.draft();
        if let Some(index) = draft.headers.iter().position(|h| h.id == id) {
            draft.headers.remove(index);
            self.replace_draft(draft);
        }
    }

    /// Rename the header row with the given id; unknown ids are a no-op.
    pub fn update_header_key(&self, id: HeaderId, key: &str) {
        let mut draft = self.draft();
        if let Some(entry) = draft.headers.iter_mut().find(|h| h.id == id) {
            entry.key = key.to_string();
            self.replace_draft(draft);
        }
    }

    /// Set the value of the header row with the given id; unknown ids are a
    /// no-op.
    pub fn update_header_value(&self, id: HeaderId, value: &str) {
        let mut draft = self.draft();
        if let Some(entry) = draft.headers.iter_mut().find(|h| h.id == id) {
            entry.value = value.to_string();
            self.replace_draft(draft);
        }
    }

    /// Switch the detail view. Selecting Body while the method carries no
    /// body is ignored; that tab is unusable.
    pub fn select_tab(&self, tab: ViewTab) {
        let mut state = self.state.borrow_mut();
        if tab == ViewTab::Body && !state.draft.method.allows_body() {
            return;
        }
        state.active_tab = tab;
    }

    /// Replace the pass-through pagination settings. Pagination is not part
    /// of the draft, so this never fires `on_change`.
    pub fn set_pagination(&self, settings: PaginationSettings) {
        self.state.borrow_mut().pagination = settings;
    }

    /// Run the configured request through the executor.
    ///
    /// Collapses the header rows (blank keys and values dropped), clears any
    /// previous outcome, and flips the loading flag before suspending. The
    /// continuation applies nothing when the component was torn down while
    /// the call was in flight. Failures are recorded for display; there is
    /// no automatic retry.
    pub fn run_test(&self) -> LocalBoxFuture<'static, ()> {
        let (executor, scope_id, connection_id, payload) = {
            let mut state = self.state.borrow_mut();
            state.loading = true;
            state.success = None;
            state.error = None;
            state.result = None;

            let payload = TestPayload::new(&state.draft, &state.pagination);
            log::debug!(
                "testing {} {} against connection {connection_id}",
                payload.data_request.method,
                payload.data_request.route,
                connection_id = state.connection_id,
            );
            (
                state.executor.clone(),
                state.scope_id,
                state.connection_id,
                payload,
            )
        };
        let weak = Rc::downgrade(&self.state);

        async move {
            let outcome = executor.test(scope_id, connection_id, payload).await;

            // Torn down mid-flight; the result has nowhere to go
            let Some(state) = weak.upgrade() else {
                return;
            };
            let this = RequestConfigurator { state };

            match outcome {
                Ok(response) => this.finish_success(response),
                Err(failure) => this.finish_failure(failure),
            }
        }
        .boxed_local()
    }

    pub fn draft(&self) -> RequestDraft {
        self.state.borrow().draft.clone()
    }

    pub fn active_tab(&self) -> ViewTab {
        self.state.borrow().active_tab
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn success(&self) -> Option<ResponseStatus> {
        self.state.borrow().success.clone()
    }

    pub fn error(&self) -> Option<TestFailure> {
        self.state.borrow().error.clone()
    }

    /// Serialized result shown in the result panel: the response body after
    /// a successful run, the failure after a failed one.
    pub fn result_text(&self) -> Option<String> {
        self.state.borrow().result.clone()
    }

    /// Item count for the result label when the response body is an array.
    pub fn result_len(&self) -> Option<usize> {
        let state = self.state.borrow();
        let parsed: Value = serde_json::from_str(state.result.as_deref()?).ok()?;
        parsed.as_array().map(Vec::len)
    }

    pub fn pagination(&self) -> PaginationSettings {
        self.state.borrow().pagination.clone()
    }

    /// Install the new draft and notify the host, unless the result is
    /// structurally identical to the last draft the host was told about.
    fn replace_draft(&self, draft: RequestDraft) {
        self.state.borrow_mut().draft = draft;
        self.flush_changes();
    }

    /// Drive `on_change` until the installed draft matches the last draft the
    /// host was told about. A mutation made from inside the callback finds
    /// the callback slot empty; `last_notified` is left alone in that case so
    /// the outer invocation picks the new draft up on its next pass.
    fn flush_changes(&self) {
        loop {
            let pending = {
                let mut state = self.state.borrow_mut();
                let changed = match &state.last_notified {
                    Some(previous) => !previous.same_request(&state.draft),
                    None => true,
                };
                if !changed {
                    return;
                }
                match state.callbacks.on_change.take() {
                    Some(cb) => {
                        state.last_notified = Some(state.draft.clone());
                        (cb, state.draft.clone())
                    }
                    None => return,
                }
            };

            // Invoked with no borrow held so the callback may re-enter
            let (mut callback, snapshot) = pending;
            callback(&snapshot);
            self.restore_on_change(callback);
        }
    }

    fn finish_success(&self, response: TestResponse) {
        let (callback, body) = {
            let mut state = self.state.borrow_mut();
            state.loading = false;
            state.success = Some(response.status.clone());
            state.result = serde_json::to_string_pretty(&response.body).ok();
            (state.callbacks.on_complete.take(), response.body)
        };

        if let Some(mut callback) = callback {
            callback(&body);
            self.restore_on_complete(callback);
        }
    }

    fn finish_failure(&self, failure: TestFailure) {
        log::error!("test request failed: {failure}");

        let mut state = self.state.borrow_mut();
        state.loading = false;
        state.result = serde_json::to_string_pretty(&failure).ok();
        state.error = Some(failure);
    }

    fn restore_on_change(&self, callback: ChangeFn) {
        let mut state = self.state.borrow_mut();
        if state.callbacks.on_change.is_none() {
            state.callbacks.on_change = Some(callback);
        }
    }

    fn restore_on_complete(&self, callback: CompleteFn) {
        let mut state = self.state.borrow_mut();
        if state.callbacks.on_complete.is_none() {
            state.callbacks.on_complete = Some(callback);
        }
    }
}
