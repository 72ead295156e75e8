pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod sse;
pub mod types;

pub use backend::{ChatBackend, DeltaStream};
pub use config::{DispatcherConfig, ProviderConfig};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::LlmError;
pub use http::HttpBackend;
pub use types::{CompletionOptions, CompletionRequest, Message, Role};
