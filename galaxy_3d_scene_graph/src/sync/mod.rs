//! Synchronization — the graph lock and thread interruption.

mod graph_lock;
mod interrupt;

pub use graph_lock::{GraphLock, ReadLock, WriteLock};
pub use interrupt::InterruptHandle;
