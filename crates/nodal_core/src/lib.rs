//! # nodal_core - Core primitives
//!
//! Identity primitives shared by every nodal crate. Every entity in a graph
//! document (scene, node, socket, edge) carries an [`Id`] minted by an
//! [`IdRegistry`]. The registry is handed to the scene at construction time;
//! only the top-level wiring reaches for [`IdRegistry::global`].

pub mod id;

pub use id::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::id::{Id, IdRegistry, SharedIds};
}
