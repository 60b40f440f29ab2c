//! Smarthost Storage Library
//!
//! This crate provides the object store abstraction and its local filesystem
//! implementation.
//!
//! # Layout
//!
//! The store is a single flat directory. An object's name on disk is its canonical
//! filename; there is no manifest or index, the directory listing is the only source
//! of truth. In-flight writes live in hidden `.<uuid>.tmp` files in the same
//! directory and are never visible under a canonical name.

pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use smarthost_core::CollisionPolicy;
pub use traits::{ObjectStream, Storage, StorageError, StorageResult};
