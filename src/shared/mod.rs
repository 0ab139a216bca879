pub mod config;
pub mod error;
pub mod output;
pub mod traits;
pub mod units;

pub use error::*;
pub use traits::*;
