mod clock;
mod fault_source;
mod identity_repo_memory;
mod notification_queue;
mod notification_sink_log;

pub use clock::*;
pub use fault_source::*;
pub use identity_repo_memory::*;
pub use notification_queue::*;
pub use notification_sink_log::*;
