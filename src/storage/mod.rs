//! Internal storage primitives shared by pools, systems and the registry.

pub use self::id_hasher::*;
pub use self::sparse::*;

mod id_hasher;
mod sparse;
