use crate::{BookId, LibraryId, Result, StateViolation};

/// A catalog item owned by exactly one library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    genre: String,
    isbn: String,
    is_available: bool,
    library_id: LibraryId,
}

impl Book {
    /// Creates an available book belonging to `library_id`.
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        isbn: impl Into<String>,
        library_id: LibraryId,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            isbn: isbn.into(),
            is_available: true,
            library_id,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }

    pub fn library_id(&self) -> LibraryId {
        self.library_id
    }

    pub fn update_properties(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
    ) {
        self.title = title.into();
        self.author = author.into();
        self.genre = genre.into();
    }

    /// Replaces the ISBN. A book held by a [`crate::Library`] is re-keyed
    /// through `Library::edit_book` instead.
    pub fn update_isbn(&mut self, isbn: impl Into<String>) {
        self.isbn = isbn.into();
    }

    pub fn mark_as_checked_out(&mut self) -> Result<()> {
        if !self.is_available {
            return Err(StateViolation::AlreadyCheckedOut.into());
        }
        self.is_available = false;
        Ok(())
    }

    pub fn mark_as_returned(&mut self) -> Result<()> {
        if self.is_available {
            return Err(StateViolation::NotCheckedOut.into());
        }
        self.is_available = true;
        Ok(())
    }

    /// Case-insensitive match on title, author or genre. `needle` must
    /// already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.title, &self.author, &self.genre]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    pub(crate) fn attach_to(&mut self, library_id: LibraryId) {
        self.library_id = library_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;

    fn book() -> Book {
        Book::new(
            BookId::new(1),
            "The Rust Programming Language",
            "Steve Klabnik",
            "Programming",
            "9781593278281",
            LibraryId::new(1),
        )
    }

    #[test]
    fn new_book_is_available() {
        let book = book();
        assert!(book.is_available());
        assert_eq!(book.library_id(), LibraryId::new(1));
        assert_eq!(book.isbn(), "9781593278281");
    }

    #[test]
    fn checkout_then_return_restores_availability() {
        let mut book = book();
        book.mark_as_checked_out().unwrap();
        assert!(!book.is_available());
        book.mark_as_returned().unwrap();
        assert!(book.is_available());
    }

    #[test]
    fn redundant_checkout_is_rejected() {
        let mut book = book();
        book.mark_as_checked_out().unwrap();
        assert_eq!(
            book.mark_as_checked_out(),
            Err(DomainError::InvalidState(StateViolation::AlreadyCheckedOut))
        );
        assert!(!book.is_available());
    }

    #[test]
    fn returning_an_available_book_is_rejected() {
        let mut book = book();
        assert_eq!(
            book.mark_as_returned(),
            Err(DomainError::InvalidState(StateViolation::NotCheckedOut))
        );
    }

    #[test]
    fn update_properties_keeps_isbn_and_availability() {
        let mut book = book();
        book.mark_as_checked_out().unwrap();
        book.update_properties("Programming Rust", "Jim Blandy", "Systems");
        assert_eq!(book.title(), "Programming Rust");
        assert_eq!(book.author(), "Jim Blandy");
        assert_eq!(book.genre(), "Systems");
        assert_eq!(book.isbn(), "9781593278281");
        assert!(!book.is_available());

        book.update_isbn("9781492052593");
        assert_eq!(book.isbn(), "9781492052593");
    }

    #[test]
    fn keyword_match_covers_title_author_and_genre() {
        let book = book();
        assert!(book.matches_lowercase("rust"));
        assert!(book.matches_lowercase("klabnik"));
        assert!(book.matches_lowercase("program"));
        assert!(book.matches_lowercase(""));
        assert!(!book.matches_lowercase("haskell"));
    }
}
