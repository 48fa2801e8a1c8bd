#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod interceptor;
pub mod logging;
pub mod messages;
pub mod models;
pub mod paths;
pub mod protocol;
pub mod session;
pub mod table;

pub use config::SwapperConfig;
pub use error::{Result, SwapperError};
pub use interceptor::{RequestDecision, RequestFilter, RequestInterceptor, RequestSession};
pub use session::SwapperSession;
pub use table::SwapTable;
