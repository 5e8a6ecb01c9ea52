//! Headless state model for building and test-running API data requests.
//!
//! [`RequestConfigurator`] owns an editable [`RequestDraft`] (method, route,
//! headers, body), a detail-tab state machine, and the test-execution cycle.
//! The actual HTTP call and the lookup of saved requests are delegated to
//! the host through the [`RequestExecutor`] and [`RequestLoader`] contracts;
//! the host observes the component through [`Callbacks`].

mod configurator;
mod executor;
mod types;

pub use configurator::{ConfiguratorOptions, RequestConfigurator};
pub use executor::{Callbacks, ChangeFn, CompleteFn, RequestExecutor, RequestLoader};
pub use types::{
    HeaderEntry, HeaderId, HttpMethod, PaginationSettings, PreparedRequest, RequestDescriptor,
    RequestDraft, ResponseStatus, TestFailure, TestPayload, TestResponse, ViewTab,
};
