//! Tracing setup. Starts at `info` (or `RUST_LOG`) and is narrowed once the
//! settings file has been read.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
