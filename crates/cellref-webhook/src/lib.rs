//! Remote content reached through a webhook relay.
//!
//! The relay is a single configured endpoint. Every write is a JSON POST of
//! `{event, resource, data}`; the relay creates when `resource` is null and
//! updates otherwise. Reads are plain GETs on the pointer URL.
//!
//! # Modules
//!
//! - [`envelope`] -- request envelope and create-response parsing
//! - [`transport`] -- the [`HttpTransport`] seam, its reqwest implementation,
//!   and a recording double
//! - [`remote`] -- [`RemoteStore`], the `ContentStore` adapter

pub mod envelope;
pub mod remote;
pub mod transport;

pub use envelope::{locator_from_response, WebhookEnvelope};
pub use remote::RemoteStore;
pub use transport::{HttpTransport, RecordedCall, RecordingTransport, ReqwestTransport, DEFAULT_TIMEOUT};
