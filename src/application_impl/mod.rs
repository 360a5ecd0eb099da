mod auth_gate;
mod claims_codec_jwt;
mod fault_demo_service_impl;
mod identity_service_impl;
mod password_hasher_argon2;
mod pipeline;
mod token_authority_impl;

pub use auth_gate::*;
pub use claims_codec_jwt::*;
pub use fault_demo_service_impl::*;
pub use identity_service_impl::*;
pub use password_hasher_argon2::*;
pub use pipeline::*;
pub use token_authority_impl::*;
