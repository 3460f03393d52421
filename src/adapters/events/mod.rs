//! Event bus adapters.
//!
//! - `InProcessEventBus` - Concurrent fan-out bus living inside one process

mod in_process;

pub use in_process::InProcessEventBus;
