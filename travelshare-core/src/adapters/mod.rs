//! Backend adapters
//!
//! Concrete implementations of the backend ports: the Supabase REST
//! client for real deployments, the in-memory backend for demo mode and
//! tests, and the local change feed both publish into.

pub mod changes;
pub mod memory;
pub mod supabase;

pub use changes::LocalChangeFeed;
pub use memory::MemoryBackend;
pub use supabase::SupabaseClient;
