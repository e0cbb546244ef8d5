//! # vigil-core
//!
//! Value model underneath the Vigil change monitor.
//!
//! This crate provides:
//! - A dynamic [`Value`] with scalars and shared composites (records,
//!   sequences, sets, maps, functions)
//! - Name-based property access with ownership classification
//! - Hierarchical property labels ([`PathLabel`])
//! - Structural cloning ([`deep_clone`]) with clone hooks and exclusion of
//!   injected template references
//!
//! ## Example
//!
//! ```rust
//! use vigil_core::{deep_clone, Value};
//! use serde_json::json;
//!
//! let original = Value::from(json!({"user": {"name": "Alice"}}));
//! let copy = deep_clone(&original, true);
//!
//! copy.get_property("user")
//!     .unwrap()
//!     .set_property("name", Value::from("Bob"))
//!     .unwrap();
//!
//! assert_eq!(original.to_json(), json!({"user": {"name": "Alice"}}));
//! assert_eq!(copy.to_json(), json!({"user": {"name": "Bob"}}));
//! ```

pub mod clone;
pub mod collections;
pub mod error;
pub mod fields;
pub mod path;
pub mod property;
pub mod record;
pub mod value;

pub use clone::deep_clone;
pub use collections::{ValueMap, ValueSet};
pub use error::CoreError;
pub use fields::Fields;
pub use path::{PathLabel, CONTEXT_KEY, DEFAULT_SEPARATOR};
pub use property::{parse_index, parse_length, Ownership, LENGTH, MAX_LENGTH, SIZE};
pub use record::{CloneHook, Function, NativeFn, Record, Template};
pub use value::{Shared, Value};
