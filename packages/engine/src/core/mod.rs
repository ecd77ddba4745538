//! Core plumbing shared by every layer: slot storage, errors, logging.

pub mod arena;
pub mod error;
pub mod logging;

pub use arena::Arena;
pub use error::{SimError, SimResult};
