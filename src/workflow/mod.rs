pub mod coordinator;
pub mod progress;
pub mod session;

pub use coordinator::Coordinator;
