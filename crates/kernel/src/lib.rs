//! Core traits, settings and module registry for the LMS service.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module, ModuleHealth};
pub use registry::{ModuleKind, ModuleRegistry};
