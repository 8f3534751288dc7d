use std::collections::BTreeSet;

use crate::{Book, BookId, PatronId, Result, StateViolation};

/// A borrower. Holds ids of the books it currently has checked out; the
/// books themselves stay owned by their library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patron {
    id: PatronId,
    name: String,
    checked_out_books: BTreeSet<BookId>,
}

impl Patron {
    pub fn new(id: PatronId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            checked_out_books: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> PatronId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn update_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Ids of checked-out books in ascending order.
    pub fn checked_out_books(&self) -> impl Iterator<Item = BookId> + '_ {
        self.checked_out_books.iter().copied()
    }

    pub fn has_checked_out(&self, book_id: BookId) -> bool {
        self.checked_out_books.contains(&book_id)
    }

    pub fn has_checkouts(&self) -> bool {
        !self.checked_out_books.is_empty()
    }

    /// Marks `book` checked out and records it. Nothing changes on failure.
    pub fn checkout_book(&mut self, book: &mut Book) -> Result<()> {
        if self.has_checked_out(book.id()) {
            return Err(StateViolation::AlreadyCheckedOut.into());
        }
        book.mark_as_checked_out()?;
        self.checked_out_books.insert(book.id());
        Ok(())
    }

    /// Marks `book` returned and forgets it. Fails unless this patron holds it.
    pub fn return_book(&mut self, book: &mut Book) -> Result<()> {
        if !self.has_checked_out(book.id()) {
            return Err(StateViolation::NotCheckedOutByPatron.into());
        }
        book.mark_as_returned()?;
        self.checked_out_books.remove(&book.id());
        Ok(())
    }
}
