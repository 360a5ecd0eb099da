//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a volatile dependency:
//!     → registry.rs (look up the call site's single breaker)
//!     → guard.rs (breaker as one link of a guard chain)
//!     → circuit_breaker.rs (track failures, serve the fallback while open)
//! ```

mod circuit_breaker;
mod guard;
mod registry;

pub use circuit_breaker::*;
pub use guard::*;
pub use registry::*;
