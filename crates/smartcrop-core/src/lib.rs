pub mod config;
pub mod error;
pub mod types;

pub use config::SmartCropConfig;
pub use error::{Result, SmartCropError};
pub use types::*;
