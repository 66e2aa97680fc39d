//! Storage mechanisms for persisting and retrieving identities

pub mod memory;
pub mod traits;

pub use memory::MemoryIdentityStore;
pub use traits::IdentityStore;
