/// NodeParent — lock delegation toward the owning graph.
///
/// Nodes do not own a lock. A lock request travels up to the graph that owns
/// the node; a detached node has no graph, nothing can observe it
/// concurrently, and it proceeds without locking.

use crate::error::Result;
use crate::sync::{ReadLock, WriteLock};

pub trait NodeParent {
    /// Write lock of the owning graph, `None` when there is no owning graph.
    fn acquire_write_lock(&self) -> Result<Option<WriteLock>>;

    /// Read lock of the owning graph, `None` when there is no owning graph.
    fn acquire_read_lock(&self) -> Result<Option<ReadLock>>;
}
