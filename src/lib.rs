//! Library management service: libraries own books, patrons check them out.
//!
//! [`app::run`] wires the in-memory store, the module registry and the HTTP
//! server. Each resource lives in [`modules`] as a [`lms_kernel::Module`].

// Module OpenAPI fragments are large `json!` literals.
#![recursion_limit = "256"]

pub mod app;
pub mod error;
pub mod modules;
pub mod seed;
pub mod validation;

pub use app::{build_registry, openapi_document, run};
pub use error::{ServiceError, ServiceResult};
