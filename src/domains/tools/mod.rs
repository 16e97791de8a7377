//! Tools domain module.
//!
//! Everything between an inbound tool call and the backend that runs it.
//!
//! ## Architecture
//!
//! - `descriptor.rs` - Canonical tool description (name, description, schema)
//! - `registry.rs` - Merged name -> backend mapping and its swappable handle
//! - `discovery.rs` - Builds a registry from the connected backends
//! - `resolver.rs` - Selector parsing and argument merging
//! - `router.rs` - Dispatch to the owning backend with timing
//! - `export.rs` - Integration records for third-party platforms
//! - `error.rs` - Tool-specific error types

mod descriptor;
pub mod discovery;
mod error;
pub mod export;
mod registry;
pub mod resolver;
pub mod router;

pub use descriptor::{ParamSpec, ToolDescriptor};
pub use discovery::discover;
pub use error::ToolError;
pub use export::{ExportRecord, ToolExporter};
pub use registry::{CollisionPolicy, RegistryEntry, RegistryHandle, ToolRegistry};
pub use resolver::{ResolvedInvocation, resolve_payload, resolve_query};
pub use router::{InvocationRouter, InvocationSuccess};
