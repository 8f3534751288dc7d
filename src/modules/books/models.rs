use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use lms_domain::Book;

use crate::validation::{
    Rules, Validate, ValidationErrors, AUTHOR_MAX, GENRE_MAX, ISBN_MAX, TITLE_MAX,
};

/// A book as returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookDto {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub is_available: bool,
    /// Library currently holding the book.
    pub library_id: u64,
}

impl From<&Book> for BookDto {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id().get(),
            title: book.title().to_string(),
            author: book.author().to_string(),
            genre: book.genre().to_string(),
            isbn: book.isbn().to_string(),
            is_available: book.is_available(),
            library_id: book.library_id().get(),
        }
    }
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self::from(&book)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub library_id: u64,
}

impl Validate for CreateBook {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .positive("library_id", self.library_id)
            .text("title", &self.title, TITLE_MAX)
            .text("author", &self.author, AUTHOR_MAX)
            .text("genre", &self.genre, GENRE_MAX)
            .text("isbn", &self.isbn, ISBN_MAX)
            .finish()
    }
}

/// Replaces the descriptive fields and ISBN of `book_id` in `library_id`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EditBook {
    pub library_id: u64,
    pub book_id: u64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
}

impl Validate for EditBook {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .positive("library_id", self.library_id)
            .positive("book_id", self.book_id)
            .text("title", &self.title, TITLE_MAX)
            .text("author", &self.author, AUTHOR_MAX)
            .text("genre", &self.genre, GENRE_MAX)
            .text("isbn", &self.isbn, ISBN_MAX)
            .finish()
    }
}

/// Body of both `/checkout` and `/checkin`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookLoan {
    pub patron_id: u64,
    pub library_id: u64,
    pub isbn: String,
}

impl Validate for BookLoan {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .positive("patron_id", self.patron_id)
            .positive("library_id", self.library_id)
            .not_empty("isbn", &self.isbn)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use lms_domain::{BookId, LibraryId};

    use super::*;

    fn create() -> CreateBook {
        CreateBook {
            title: "The Hobbit".into(),
            author: "J.R.R. Tolkien".into(),
            genre: "Fantasy".into(),
            isbn: "9780261103".into(),
            library_id: 1,
        }
    }

    #[test]
    fn dto_copies_every_field() {
        let book = Book::new(
            BookId::new(4),
            "Dune",
            "Frank Herbert",
            "Science Fiction",
            "9780441013",
            LibraryId::new(2),
        );
        let dto = BookDto::from(&book);
        assert_eq!(dto.id, 4);
        assert_eq!(dto.library_id, 2);
        assert!(dto.is_available);
        assert_eq!(dto.isbn, "9780441013");
    }

    #[test]
    fn create_book_rules() {
        assert!(create().validate().is_ok());

        let mut long_isbn = create();
        long_isbn.isbn = "97802611030000".into();
        let errors = long_isbn.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["isbn"]);

        let mut genre = create();
        genre.genre = "g".repeat(GENRE_MAX + 1);
        genre.library_id = 0;
        let errors = genre.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["library_id", "genre"]);
    }

    #[test]
    fn loan_requires_ids_and_isbn() {
        let loan = BookLoan {
            patron_id: 0,
            library_id: 0,
            isbn: " ".into(),
        };
        assert_eq!(loan.validate().unwrap_err().len(), 3);
    }
}
