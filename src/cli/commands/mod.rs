//! Command implementations

mod flow;
mod hook;
mod init;
mod release_notes;
mod service;
mod task;

pub use flow::flow_cmd;
pub use hook::hook_run;
pub use init::init;
pub use release_notes::release_notes;
pub use service::service_cmd;
pub use task::task_cmd;
