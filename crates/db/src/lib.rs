//! Persistence gateways for libraries, books and patrons.
//!
//! Handlers open a [`Session`] per request, read and stage writes through the
//! repository traits, then [`Session::commit`] once. [`MemoryDatabase`] is the
//! storage engine shipped with the service.

mod error;
mod memory;
mod module;
mod repository;

pub use error::DbError;
pub use memory::{MemoryDatabase, MemorySession};
pub use module::DbModule;
pub use repository::{
    BookRepository, Database, LibraryRepository, PatronRepository, Session, StoreStats,
};

pub type Result<T> = std::result::Result<T, DbError>;
