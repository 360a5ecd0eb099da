mod auth;
mod breaker;
mod identity;
mod subject;

pub use auth::*;
pub use breaker::*;
pub use identity::*;
pub use subject::*;
