//! Domain source adapters
//!
//! Describe the API surface guards are generated against, either from a
//! function list descriptor or from an OpenAPI document.

pub mod functions;
pub mod openapi;

pub use functions::{FunctionListDescriptor, FunctionListSource};
pub use openapi::{OpenApiDocument, OpenApiSource};
