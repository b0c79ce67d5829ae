//! # propstore - File-backed hierarchical property store
//!
//! Key-value properties attached to entities (projects, assets, shots, ...),
//! each entity backed by one JSON file on a possibly shared filesystem, with
//! inheritance from a parent entity.
//!
//! ## Features
//!
//! - **Inheritance**: Own keys shadow the keys of the parent chain
//! - **Cross-process locking**: Directory-sentinel locks that work on network shares
//! - **Lock-free reads**: Torn reads from concurrent writers are detected and retried
//! - **Bounded staleness**: A shared cache that trusts snapshots for a time
//!   window, then re-validates them by modification time
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use propstore::{DirectoryLayout, PropertyStore};
//! use std::sync::Arc;
//!
//! # fn example() -> propstore::Result<()> {
//! let layout = DirectoryLayout::new("/shared/show/properties");
//!
//! let project = Arc::new(PropertyStore::new(layout.entity("project")));
//! let shot = PropertyStore::builder(layout.entity("shot_010"))
//!     .parent(Arc::clone(&project))
//!     .build();
//!
//! project.update("frame_rate", 24)?;
//! shot.update("frame_rate", 25)?;
//!
//! assert_eq!(shot.get("frame_rate")?, Some(serde_json::json!(25)));
//! assert_eq!(project.get("frame_rate")?, Some(serde_json::json!(24)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Consistency
//!
//! Writes (`update`, `update_dict`, `remove`, `clear`) are serialized per file
//! by a [`FileLock`] and always re-read the file from disk inside the lock,
//! so concurrent writers never lose each other's keys.
//!
//! Reads never lock. Within the cache validity window (20s by default) a
//! store may not see edits made by other processes; its own edits are always
//! visible. Call [`PropertyStore::clear_all_caches`] or
//! [`PropertyStore::reload`] when an external change is suspected.

// Core modules
mod error;
mod store;
mod sync;

pub mod cache;
pub mod config;
pub mod layout;
pub mod lock;
pub mod storage;

// Re-exports from core
pub use cache::PropertyCache;
pub use config::{LockOptions, StoreOptions, StoreOptionsBuilder};
pub use error::{Error, Result};
pub use layout::{DirectoryLayout, LayoutEntity, PropertyLocation};
pub use lock::{FileLock, LockGuard, WaitLock};
pub use storage::{JsonStorage, StorageBackend};
pub use store::{PropertyStore, PropertyStoreBuilder};

/// A property file's content: string keys to JSON values
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;
