//! Domain model for the library management service.
//!
//! A [`Library`] owns its [`Book`]s keyed by ISBN and arbitrates checkout and
//! check-in against a [`Patron`]. Availability lives on the book; the patron
//! only records which book ids it currently holds.

mod book;
mod error;
mod id;
mod library;
mod patron;

pub use book::Book;
pub use error::{BookRef, DomainError, StateViolation};
pub use id::{BookId, LibraryId, PatronId};
pub use library::Library;
pub use patron::Patron;

pub type Result<T> = std::result::Result<T, DomainError>;
