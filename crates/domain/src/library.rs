use std::collections::BTreeMap;

use crate::{Book, BookId, BookRef, DomainError, LibraryId, Patron, Result, StateViolation};

/// Aggregate root owning a collection of books keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    id: LibraryId,
    name: String,
    books: BTreeMap<String, Book>,
}

impl Library {
    pub fn new(id: LibraryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            books: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> LibraryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn update_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Books ordered by ISBN.
    pub fn books(&self) -> impl Iterator<Item = &Book> + '_ {
        self.books.values()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn book(&self, isbn: &str) -> Option<&Book> {
        self.books.get(isbn)
    }

    pub fn book_by_id(&self, id: BookId) -> Option<&Book> {
        self.books.values().find(|book| book.id() == id)
    }

    pub fn has_checkouts(&self) -> bool {
        self.books.values().any(|book| !book.is_available())
    }

    /// Takes ownership of `book` and points its back-reference here.
    pub fn add_book(&mut self, mut book: Book) -> Result<()> {
        if book.isbn().trim().is_empty() {
            return Err(DomainError::InvalidArgument(
                "book must have an ISBN".to_string(),
            ));
        }
        if self.books.contains_key(book.isbn()) {
            return Err(DomainError::DuplicateKey {
                isbn: book.isbn().to_string(),
            });
        }

        book.attach_to(self.id);
        self.books.insert(book.isbn().to_string(), book);
        Ok(())
    }

    /// Detaches the book with `isbn` and hands it back to the caller.
    pub fn remove_book(&mut self, isbn: &str) -> Result<Book> {
        self.books
            .remove(isbn)
            .ok_or_else(|| DomainError::isbn_not_found(isbn))
    }

    /// Books whose title, author or genre contains `keyword`, ignoring case.
    ///
    /// The returned iterator is lazy and can be cloned to restart the scan.
    pub fn search_books<'a>(
        &'a self,
        keyword: &str,
    ) -> impl Iterator<Item = &'a Book> + Clone + 'a {
        let needle = keyword.to_lowercase();
        self.books
            .values()
            .filter(move |book| book.matches_lowercase(&needle))
    }

    /// Updates descriptive fields and the ISBN of the book with `book_id`,
    /// re-keying it when the ISBN changes.
    pub fn edit_book(
        &mut self,
        book_id: BookId,
        title: &str,
        author: &str,
        genre: &str,
        isbn: &str,
    ) -> Result<()> {
        let current_isbn = self
            .book_by_id(book_id)
            .map(|book| book.isbn().to_string())
            .ok_or(DomainError::NotFound(BookRef::Id(book_id)))?;

        if isbn.trim().is_empty() {
            return Err(DomainError::InvalidArgument(
                "book must have an ISBN".to_string(),
            ));
        }
        if current_isbn != isbn && self.books.contains_key(isbn) {
            return Err(DomainError::DuplicateKey {
                isbn: isbn.to_string(),
            });
        }

        let mut book = self.remove_book(&current_isbn)?;
        book.update_properties(title, author, genre);
        book.update_isbn(isbn);
        self.books.insert(isbn.to_string(), book);
        Ok(())
    }

    pub fn checkout_book(&mut self, isbn: &str, patron: &mut Patron) -> Result<()> {
        let book = self
            .books
            .get_mut(isbn)
            .ok_or_else(|| DomainError::isbn_not_found(isbn))?;
        if !book.is_available() {
            return Err(StateViolation::AlreadyCheckedOut.into());
        }

        patron.checkout_book(book)?;
        tracing::debug!(
            library_id = %self.id,
            patron_id = %patron.id(),
            isbn,
            "book checked out"
        );
        Ok(())
    }

    pub fn return_book(&mut self, isbn: &str, patron: &mut Patron) -> Result<()> {
        let book = self
            .books
            .get_mut(isbn)
            .ok_or_else(|| DomainError::isbn_not_found(isbn))?;

        patron.return_book(book)?;
        tracing::debug!(
            library_id = %self.id,
            patron_id = %patron.id(),
            isbn,
            "book returned"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatronId;

    fn library_with(books: &[(u64, &str, &str)]) -> Library {
        let mut library = Library::new(LibraryId::new(1), "L1");
        for (id, isbn, title) in books {
            library
                .add_book(Book::new(
                    BookId::new(*id),
                    *title,
                    "Author",
                    "Genre",
                    *isbn,
                    LibraryId::new(1),
                ))
                .unwrap();
        }
        library
    }

    #[test]
    fn add_book_rejects_duplicate_isbn() {
        let mut library = library_with(&[(1, "978-1", "First")]);
        let twin = Book::new(
            BookId::new(2),
            "Second",
            "Someone",
            "Other",
            "978-1",
            LibraryId::new(1),
        );

        assert_eq!(
            library.add_book(twin),
            Err(DomainError::DuplicateKey {
                isbn: "978-1".to_string()
            })
        );
        assert_eq!(library.book_count(), 1);
        assert_eq!(library.book("978-1").unwrap().title(), "First");
    }

    #[test]
    fn add_book_rejects_blank_isbn() {
        let mut library = Library::new(LibraryId::new(1), "L1");
        let book = Book::new(BookId::new(1), "T", "A", "G", "  ", LibraryId::new(1));
        assert!(matches!(
            library.add_book(book),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn add_book_repoints_back_reference() {
        let mut library = Library::new(LibraryId::new(5), "Westside Library");
        let book = Book::new(BookId::new(1), "T", "A", "G", "978-1", LibraryId::new(2));
        library.add_book(book).unwrap();
        assert_eq!(library.book("978-1").unwrap().library_id(), LibraryId::new(5));
    }

    #[test]
    fn same_isbn_may_live_in_two_libraries() {
        let mut first = library_with(&[(1, "978-1", "First")]);
        let mut second = Library::new(LibraryId::new(2), "L2");
        let copy = Book::new(BookId::new(2), "First", "A", "G", "978-1", LibraryId::new(2));
        second.add_book(copy).unwrap();
        assert!(first.remove_book("978-1").is_ok());
        assert!(second.book("978-1").is_some());
    }

    #[test]
    fn remove_book_detaches_and_returns_it() {
        let mut library = library_with(&[(1, "978-1", "First"), (2, "978-2", "Second")]);

        let removed = library.remove_book("978-1").unwrap();

        assert_eq!(removed.id(), BookId::new(1));
        assert_eq!(library.book_count(), 1);
        assert_eq!(
            library.remove_book("978-1"),
            Err(DomainError::NotFound(BookRef::Isbn("978-1".to_string())))
        );
    }

    #[test]
    fn search_matches_title_author_and_genre() {
        let library = library_with(&[(1, "978-1", "Toolkit One"), (2, "978-2", "Other")]);

        let titles: Vec<_> = library.search_books("toolkit").map(Book::title).collect();
        assert_eq!(titles, vec!["Toolkit One"]);

        assert_eq!(library.search_books("AUTHOR").count(), 2);
        assert_eq!(library.search_books("genre").count(), 2);
        assert_eq!(library.search_books("").count(), 2);
        assert_eq!(library.search_books("missing").count(), 0);
    }

    #[test]
    fn search_is_restartable() {
        let library = library_with(&[(1, "978-1", "Toolkit One"), (2, "978-2", "Toolkit Two")]);
        let search = library.search_books("toolkit");
        let first_pass: Vec<_> = search.clone().map(Book::id).collect();
        let second_pass: Vec<_> = search.map(Book::id).collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass.len(), 2);
    }

    #[test]
    fn checkout_and_return_round_trip() {
        let mut library = library_with(&[(1, "978-1", "First")]);
        let mut patron = Patron::new(PatronId::new(1), "P1");

        library.checkout_book("978-1", &mut patron).unwrap();
        assert!(!library.book("978-1").unwrap().is_available());
        assert_eq!(patron.checked_out_books().collect::<Vec<_>>(), vec![BookId::new(1)]);

        library.return_book("978-1", &mut patron).unwrap();
        assert!(library.book("978-1").unwrap().is_available());
        assert_eq!(patron.checked_out_books().count(), 0);
    }

    #[test]
    fn checkout_of_missing_isbn_is_not_found() {
        let mut library = library_with(&[(1, "978-1", "First")]);
        let mut patron = Patron::new(PatronId::new(1), "P1");
        assert_eq!(
            library.checkout_book("978-9", &mut patron),
            Err(DomainError::NotFound(BookRef::Isbn("978-9".to_string())))
        );
    }

    #[test]
    fn second_patron_cannot_checkout_same_book() {
        let mut library = library_with(&[(1, "978-1", "First")]);
        let mut first = Patron::new(PatronId::new(1), "P1");
        let mut second = Patron::new(PatronId::new(2), "P2");
        library.checkout_book("978-1", &mut first).unwrap();

        for patron in [&mut first, &mut second] {
            assert_eq!(
                library.checkout_book("978-1", patron),
                Err(DomainError::InvalidState(StateViolation::AlreadyCheckedOut))
            );
        }
        assert!(!second.has_checkouts());
    }

    #[test]
    fn return_by_other_patron_fails_even_when_book_is_out() {
        let mut library = library_with(&[(1, "978-1", "First")]);
        let mut holder = Patron::new(PatronId::new(1), "P1");
        let mut stranger = Patron::new(PatronId::new(2), "P2");
        library.checkout_book("978-1", &mut holder).unwrap();

        assert_eq!(
            library.return_book("978-1", &mut stranger),
            Err(DomainError::InvalidState(StateViolation::NotCheckedOutByPatron))
        );
        assert!(!library.book("978-1").unwrap().is_available());
        assert!(holder.has_checked_out(BookId::new(1)));
    }

    #[test]
    fn return_of_never_borrowed_book_fails() {
        let mut library = library_with(&[(1, "978-1", "First")]);
        let mut patron = Patron::new(PatronId::new(1), "P1");
        assert!(matches!(
            library.return_book("978-1", &mut patron),
            Err(DomainError::InvalidState(StateViolation::NotCheckedOutByPatron))
        ));
        assert!(library.book("978-1").unwrap().is_available());
    }

    #[test]
    fn edit_book_rekeys_on_isbn_change() {
        let mut library = library_with(&[(1, "978-1", "First"), (2, "978-2", "Second")]);

        library
            .edit_book(BookId::new(1), "First, revised", "New Author", "Essay", "978-3")
            .unwrap();

        assert!(library.book("978-1").is_none());
        let book = library.book("978-3").unwrap();
        assert_eq!(book.id(), BookId::new(1));
        assert_eq!(book.title(), "First, revised");
        assert_eq!(book.isbn(), "978-3");
    }

    #[test]
    fn edit_book_rejects_colliding_isbn() {
        let mut library = library_with(&[(1, "978-1", "First"), (2, "978-2", "Second")]);

        let err = library
            .edit_book(BookId::new(1), "First", "Author", "Genre", "978-2")
            .unwrap_err();

        assert!(matches!(err, DomainError::DuplicateKey { .. }));
        assert_eq!(library.book("978-1").unwrap().title(), "First");
        assert_eq!(library.book("978-2").unwrap().id(), BookId::new(2));
    }

    #[test]
    fn edit_book_with_unknown_id_is_not_found() {
        let mut library = library_with(&[(1, "978-1", "First")]);
        assert_eq!(
            library.edit_book(BookId::new(42), "T", "A", "G", "978-1"),
            Err(DomainError::NotFound(BookRef::Id(BookId::new(42))))
        );
    }

    #[test]
    fn has_checkouts_tracks_availability() {
        let mut library = library_with(&[(1, "978-1", "First")]);
        let mut patron = Patron::new(PatronId::new(1), "P1");
        assert!(!library.has_checkouts());
        library.checkout_book("978-1", &mut patron).unwrap();
        assert!(library.has_checkouts());
    }
}
