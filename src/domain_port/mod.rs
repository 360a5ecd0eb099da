mod clock;
mod fault_source;
mod identity_repo;
mod notification_sink;
mod password_hasher;

pub use clock::*;
pub use fault_source::*;
pub use identity_repo::*;
pub use notification_sink::*;
pub use password_hasher::*;
