use std::fmt;

use thiserror::Error;

use crate::BookId;

/// Failures raised by the Library/Book/Patron rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("book with ISBN '{isbn}' already exists in the library")]
    DuplicateKey { isbn: String },

    #[error("book {0} does not exist in the library")]
    NotFound(BookRef),

    #[error("{0}")]
    InvalidState(StateViolation),
}

impl DomainError {
    pub(crate) fn isbn_not_found(isbn: &str) -> Self {
        Self::NotFound(BookRef::Isbn(isbn.to_string()))
    }
}

/// Key a missing book was looked up by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookRef {
    Isbn(String),
    Id(BookId),
}

impl fmt::Display for BookRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookRef::Isbn(isbn) => write!(f, "with ISBN '{isbn}'"),
            BookRef::Id(id) => write!(f, "with ID {id}"),
        }
    }
}

/// Guard violated by a state transition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateViolation {
    #[error("book is already checked out")]
    AlreadyCheckedOut,
    #[error("book is not checked out")]
    NotCheckedOut,
    #[error("book was not checked out by this patron")]
    NotCheckedOutByPatron,
    #[error("library still has checked-out books")]
    LibraryHasCheckouts,
    #[error("patron still has checked-out books")]
    PatronHasCheckouts,
}

impl From<StateViolation> for DomainError {
    fn from(violation: StateViolation) -> Self {
        Self::InvalidState(violation)
    }
}
