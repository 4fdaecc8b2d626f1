//! quizdesk-client: portal backend integrations.
//!
//! Implements the `PortalBackend` and `AdminBackend` traits over HTTP, loads
//! client configuration, and provides an in-memory mock for tests.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{load_config, load_config_from, ClientConfig};
pub use http::{AuthResponse, HttpBackend};
pub use mock::MockBackend;
