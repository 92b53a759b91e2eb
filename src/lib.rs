pub mod config;
pub mod error;
pub mod runtime;

pub use config::{Costs, EngineConfig};
pub use error::{Error, Malformed};
pub use runtime::{run, Outcome, Status};
