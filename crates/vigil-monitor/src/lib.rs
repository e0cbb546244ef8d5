//! # vigil-monitor
//!
//! Change tracking for composite values.
//!
//! A [`Monitor`] wraps a record, sequence, set, map or function and behaves
//! like it for reads, while every write made through the monitor is recorded
//! in a shared [`TrackingContext`]. The context can later restore the
//! original state ([`TrackingContext::roll_back`]), accept the current one
//! ([`TrackingContext::commit`]) or produce an independent copy
//! ([`TrackingContext::clone_monitor`]).
//!
//! ## Features
//!
//! - Recursive monitoring of nested composites sharing one context
//! - Per-path value coercion ([`Coercion`]) and pluggable equality
//!   ([`Equality`])
//! - Detection of repeated changes without an intervening commit
//! - Configuration via builder or serde-loadable [`MonitorOptions`]
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use vigil_core::Value;
//! use vigil_monitor::{Monitor, MonitorConfig};
//!
//! let config = MonitorConfig::builder().recursive(true).build();
//! let monitor = Monitor::wrap(Value::from(json!({"obj": {"x": 1}})), config).unwrap();
//!
//! let obj = monitor.get("obj").unwrap().unwrap().monitored().unwrap();
//! obj.set("x", 2).unwrap();
//! monitor.set("obj", Value::from(json!({"x": 9}))).unwrap();
//!
//! let context = monitor.context();
//! assert_eq!(context.changed_labels(), vec!["obj.x", "obj"]);
//!
//! context.roll_back().unwrap();
//! assert_eq!(monitor.to_json(), json!({"obj": {"x": 1}}));
//! assert!(!context.has_changed());
//! ```

pub mod coercion;
pub mod config;
pub mod context;
pub mod equality;
pub mod error;
pub mod monitor;

pub use coercion::{CoerceFn, Coercion};
pub use config::{MonitorConfig, MonitorConfigBuilder, MonitorOptions};
pub use context::{CloneFn, CloneOptions, TrackingContext};
pub use equality::{CompareFn, Equality};
pub use error::{MonitorError, Result};
pub use monitor::{Monitor, Property};
