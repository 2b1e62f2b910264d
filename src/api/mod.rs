//! REST API clients for the Torn and FFScouter services.
//!
//! Both APIs authenticate with an API key passed as a query parameter
//! and report failures as HTTP 200 responses carrying an `error`
//! object, which the clients screen for before deserializing.

pub mod error;
pub mod ffscouter;
pub mod torn;

pub use error::ApiError;
pub use ffscouter::FfScouterClient;
pub use torn::TornClient;
