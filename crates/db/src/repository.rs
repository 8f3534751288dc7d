use async_trait::async_trait;
use serde::Serialize;

use lms_domain::{Book, BookId, Library, LibraryId, Patron, PatronId};

use crate::Result;

/// Storage engine handle shared by every request.
#[async_trait]
pub trait Database: Send + Sync + 'static {
    type Session: Session;

    async fn begin(&self) -> Result<Self::Session>;

    async fn stats(&self) -> Result<StoreStats>;
}

/// Unit of work: reads see the session's own staged writes, and nothing is
/// visible to other sessions until [`Session::commit`].
#[async_trait]
pub trait Session: LibraryRepository + BookRepository + PatronRepository + 'static {
    async fn commit(self) -> Result<()>;

    async fn roll_back(self) -> Result<()>;
}

#[async_trait]
pub trait LibraryRepository: Send + Sync {
    fn next_library_id(&self) -> LibraryId;

    async fn add_library(&mut self, library: Library) -> Result<()>;

    async fn get_library(&self, id: LibraryId) -> Result<Option<Library>>;

    async fn get_libraries(&self) -> Result<Vec<Library>>;

    async fn edit_library(&mut self, library: Library) -> Result<()>;

    async fn delete_library(&mut self, id: LibraryId) -> Result<()>;
}

/// Read access to books across libraries. Books are written through their
/// owning [`Library`].
#[async_trait]
pub trait BookRepository: Send + Sync {
    fn next_book_id(&self) -> BookId;

    async fn get_book(&self, id: BookId) -> Result<Option<Book>>;

    /// First book with `isbn`, scanning libraries in id order.
    async fn get_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    async fn get_books(&self) -> Result<Vec<Book>>;

    async fn search_books(&self, keyword: &str) -> Result<Vec<Book>>;
}

#[async_trait]
pub trait PatronRepository: Send + Sync {
    fn next_patron_id(&self) -> PatronId;

    async fn add_patron(&mut self, patron: Patron) -> Result<()>;

    async fn get_patron(&self, id: PatronId) -> Result<Option<Patron>>;

    async fn get_patrons(&self) -> Result<Vec<Patron>>;

    async fn edit_patron(&mut self, patron: Patron) -> Result<()>;

    async fn delete_patron(&mut self, id: PatronId) -> Result<()>;
}

/// Committed row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub libraries: usize,
    pub books: usize,
    pub checked_out_books: usize,
    pub patrons: usize,
}
