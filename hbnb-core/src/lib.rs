//! Object persistence core for the HBNB console.
//!
//! This crate provides:
//! - An entity model: identity, timestamps and dynamic attributes
//! - A file-backed object table keyed by `"<Kind>.<id>"`
//! - A line-oriented command console driving both
//!
//! # Quick Start
//!
//! ```no_run
//! use hbnb_core::{EntityKind, FileStorage, StorageConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut storage = FileStorage::new(StorageConfig::default());
//!     storage.reload()?;
//!
//!     let user = storage.create(EntityKind::User);
//!     user.set("first_name", "Betty")?;
//!     let key = user.key();
//!
//!     storage.save_entity(&key)?;
//!     println!("{}", storage.get(&key).unwrap());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod console;
pub mod entity;
pub mod error;
pub mod id;
pub mod storage;

pub use config::StorageConfig;
pub use console::{Console, Flow, PROMPT};
pub use entity::{AttrValue, Entity, EntityKind, Projection};
pub use error::{ConsoleError, EntityError, StorageError};
pub use id::EntityId;
pub use storage::FileStorage;
