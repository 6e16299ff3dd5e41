//! API surface of the application being guarded.
//!
//! - [`entities::RuntimeDomain`]: operations and types available to guards
//! - [`type_ref::TypeRef`]: value shapes, rendered as Python annotations
//! - [`stubs`]: Python stub modules rendered from the domain

pub mod entities;
pub mod stubs;
pub mod type_ref;
