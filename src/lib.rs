//! A small signature-matched ECS.
//!
//! Entities are bare ids, components are plain data stored in per-type
//! [pools](component::Pool), and [systems](system::System) track exactly the
//! entities whose [signature](signature::Signature) satisfies their
//! requirements. Membership changes are batched until
//! [`Registry::update`](registry::Registry::update), which the game loop calls
//! once per frame.

#![forbid(unsafe_op_in_unsafe_fn)]

// allows referencing this crate as `signet` in derives
extern crate self as signet;

pub mod component;
pub mod entity;
pub mod registry;
pub mod signature;
mod storage;
pub mod system;

/// Re-export of all items in this crate.
pub mod prelude {
    pub use crate::component::*;
    pub use crate::entity::*;
    pub use crate::registry::*;
    pub use crate::signature::*;
    pub use crate::system::*;
}
