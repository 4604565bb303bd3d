pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AdServeError, AdServeResult};
pub use types::{effective_layout, Ad, AdGroup, AdId};
