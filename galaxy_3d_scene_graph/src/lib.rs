/*!
# Galaxy 3D Scene Graph

Concurrent spatial scene graph for the Galaxy 3D engine.

A graph owns a hierarchy of transformable nodes carrying members (renderables,
cameras, lights), keeps world-space bounding boxes current as the hierarchy
changes, and answers frustum visibility queries through a spatial index.

## Architecture

- **SpatialGraph**: Root container, owner of the graph lock and the index
- **SceneNode**: Detached, owned node subtree (no lock needed)
- **NodeHandle / MemberHandle**: Handles on attached nodes and members
- **SceneIndex**: Spatial strategy (flat list, octree, quadtree)
- **GraphLock**: Reentrant, interruptible read/write lock shared by a graph
- **Camera / Frustum**: Caller-owned view state used by visibility queries

All graph operations take the lock they need and block until it is granted.
A blocked thread can be released through its [`InterruptHandle`](galaxy3d::sync::InterruptHandle).
*/

// Internal modules
mod error;
pub mod log;
pub mod bounds;
pub mod camera;
pub mod transform;
pub mod sync;
pub mod scene;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Graph entry point
    pub use crate::scene::SpatialGraph;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Bounding volumes
    pub mod bounds {
        pub use crate::bounds::*;
    }

    // Cameras and frustums
    pub mod camera {
        pub use crate::camera::*;
    }

    // Transformations and world axes
    pub mod transform {
        pub use crate::transform::*;
    }

    // Locking and interruption
    pub mod sync {
        pub use crate::sync::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
