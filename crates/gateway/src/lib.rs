#![forbid(unsafe_code)]

pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;

pub use error::{ConfigError, GatewayError};
pub use gateway::{CategoryGateway, FlashcardGateway, Gateway};
pub use http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, GatewayConfig, HttpGateway, parse_timeout_secs};
pub use memory::{InMemoryGateway, Operation};
