//! Session-scoped registry of authenticated automation clients.
//!
//! Provides:
//! - `SessionRegistry` - create, store, look up and tear down client handles
//! - `MemoryStore` - the lock-guarded handle table behind the registry

pub mod registry;
pub mod storage;

pub use registry::{RegistryError, SessionRegistry, SharedClient};
pub use storage::MemoryStore;
