mod fault_demo_service;
mod guard;
mod identity_service;
mod token_authority;

pub use fault_demo_service::*;
pub use guard::*;
pub use identity_service::*;
pub use token_authority::*;
