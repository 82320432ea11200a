//! Graph stores for artifact nodes and depends-on edges
//!
//! The parser talks to a store only through the [`GraphStore`] trait, one
//! transaction per input file. This crate ships an in-memory store with
//! JSON snapshot persistence; other backends implement the same trait.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gradlegraph_store::{GraphStore, MemoryStore, NodeFilter};
//!
//! let mut store = MemoryStore::new();
//! store.begin_transaction()?;
//! // ... create nodes and edges ...
//! store.commit()?;
//!
//! let projects = store.find_nodes(&NodeFilter::new().with_type("PROJECT"))?;
//! ```

pub mod store;
pub mod memory;
pub mod snapshot;

pub use store::{GraphStore, GraphCounts, NodeFilter, GroupMatch, EdgeFilter, StoreError};
pub use memory::MemoryStore;
pub use snapshot::GraphSnapshot;
