use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::RwLock;

use lms_domain::{Book, BookId, Library, LibraryId, Patron, PatronId};

use crate::repository::{
    BookRepository, Database, LibraryRepository, PatronRepository, Session, StoreStats,
};
use crate::{DbError, Result};

#[derive(Debug, Default)]
struct Tables {
    libraries: BTreeMap<LibraryId, Library>,
    patrons: BTreeMap<PatronId, Patron>,
    versions: Versions,
}

/// Row versions, bumped on every committed write.
#[derive(Debug, Default, Clone)]
struct Versions {
    libraries: BTreeMap<LibraryId, u64>,
    patrons: BTreeMap<PatronId, u64>,
}

/// Per-table sequences. Ids handed to a rolled-back session are not reused.
#[derive(Debug)]
struct Sequences {
    library: AtomicU64,
    book: AtomicU64,
    patron: AtomicU64,
}

impl Default for Sequences {
    fn default() -> Self {
        Self {
            library: AtomicU64::new(1),
            book: AtomicU64::new(1),
            patron: AtomicU64::new(1),
        }
    }
}

fn next(sequence: &AtomicU64) -> u64 {
    sequence.fetch_add(1, Ordering::Relaxed)
}

/// In-memory storage engine.
///
/// Committed state sits behind an async `RwLock`. A session remembers the
/// version of every row it reads or writes, and its commit fails with
/// [`DbError::Conflict`] when another session committed one of those rows
/// in the meantime.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
    sequences: Arc<Sequences>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Session = MemorySession;

    async fn begin(&self) -> Result<MemorySession> {
        Ok(MemorySession {
            tables: self.tables.clone(),
            sequences: self.sequences.clone(),
            staged_libraries: BTreeMap::new(),
            staged_patrons: BTreeMap::new(),
            observed: Mutex::default(),
        })
    }

    async fn stats(&self) -> Result<StoreStats> {
        let tables = self.tables.read().await;
        let books = tables.libraries.values().flat_map(|library| library.books());
        let (total, checked_out) = books.fold((0, 0), |(total, out), book| {
            (total + 1, out + usize::from(!book.is_available()))
        });
        Ok(StoreStats {
            libraries: tables.libraries.len(),
            books: total,
            checked_out_books: checked_out,
            patrons: tables.patrons.len(),
        })
    }
}

/// A unit of work over [`MemoryDatabase`]. `None` entries stage deletions.
pub struct MemorySession {
    tables: Arc<RwLock<Tables>>,
    sequences: Arc<Sequences>,
    staged_libraries: BTreeMap<LibraryId, Option<Library>>,
    staged_patrons: BTreeMap<PatronId, Option<Patron>>,
    /// First committed version seen per row.
    observed: Mutex<Versions>,
}

impl MemorySession {
    pub fn has_pending_changes(&self) -> bool {
        !self.staged_libraries.is_empty() || !self.staged_patrons.is_empty()
    }

    fn observe_library(&self, tables: &Tables, id: LibraryId) {
        if let Some(&version) = tables.versions.libraries.get(&id) {
            let mut observed = self.observed.lock().unwrap_or_else(PoisonError::into_inner);
            observed.libraries.entry(id).or_insert(version);
        }
    }

    fn observe_patron(&self, tables: &Tables, id: PatronId) {
        if let Some(&version) = tables.versions.patrons.get(&id) {
            let mut observed = self.observed.lock().unwrap_or_else(PoisonError::into_inner);
            observed.patrons.entry(id).or_insert(version);
        }
    }

    async fn library_exists(&self, id: LibraryId) -> bool {
        let tables = self.tables.read().await;
        self.observe_library(&tables, id);
        match self.staged_libraries.get(&id) {
            Some(staged) => staged.is_some(),
            None => tables.libraries.contains_key(&id),
        }
    }

    async fn patron_exists(&self, id: PatronId) -> bool {
        let tables = self.tables.read().await;
        self.observe_patron(&tables, id);
        match self.staged_patrons.get(&id) {
            Some(staged) => staged.is_some(),
            None => tables.patrons.contains_key(&id),
        }
    }
}

/// The session's view of a table in id order: staged rows shadow committed
/// ones without copying either.
fn merged<'a, K, V>(
    committed: &'a BTreeMap<K, V>,
    staged: &'a BTreeMap<K, Option<V>>,
) -> impl Iterator<Item = &'a V> + 'a
where
    K: Ord + Copy + 'a,
    V: 'a,
{
    let ids: BTreeSet<K> = committed.keys().chain(staged.keys()).copied().collect();
    ids.into_iter().filter_map(move |id| match staged.get(&id) {
        Some(entry) => entry.as_ref(),
        None => committed.get(&id),
    })
}

/// Rows whose committed version moved past the one the session saw.
fn stale<K: Ord + Copy, V>(
    staged: &BTreeMap<K, Option<V>>,
    observed: &BTreeMap<K, u64>,
    committed: &BTreeMap<K, u64>,
) -> Option<K> {
    staged
        .keys()
        .copied()
        .find(|id| matches!(observed.get(id), Some(seen) if committed.get(id) != Some(seen)))
}

fn apply<K: Ord + Copy, V>(
    rows: &mut BTreeMap<K, V>,
    versions: &mut BTreeMap<K, u64>,
    staged: BTreeMap<K, Option<V>>,
) {
    for (id, entry) in staged {
        match entry {
            Some(row) => {
                rows.insert(id, row);
                *versions.entry(id).or_insert(0) += 1;
            }
            None => {
                rows.remove(&id);
                versions.remove(&id);
            }
        }
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn commit(self) -> Result<()> {
        if !self.has_pending_changes() {
            return Ok(());
        }
        let libraries = self.staged_libraries.len();
        let patrons = self.staged_patrons.len();
        let observed = self
            .observed
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        if let Some(id) = stale(
            &self.staged_libraries,
            &observed.libraries,
            &tables.versions.libraries,
        ) {
            tracing::warn!(%id, "rejecting commit over a stale library");
            return Err(DbError::conflict("library", id));
        }
        if let Some(id) = stale(
            &self.staged_patrons,
            &observed.patrons,
            &tables.versions.patrons,
        ) {
            tracing::warn!(%id, "rejecting commit over a stale patron");
            return Err(DbError::conflict("patron", id));
        }

        apply(
            &mut tables.libraries,
            &mut tables.versions.libraries,
            self.staged_libraries,
        );
        apply(
            &mut tables.patrons,
            &mut tables.versions.patrons,
            self.staged_patrons,
        );
        drop(guard);

        tracing::debug!(libraries, patrons, "session committed");
        Ok(())
    }

    async fn roll_back(self) -> Result<()> {
        tracing::debug!(
            libraries = self.staged_libraries.len(),
            patrons = self.staged_patrons.len(),
            "session rolled back"
        );
        Ok(())
    }
}

#[async_trait]
impl LibraryRepository for MemorySession {
    fn next_library_id(&self) -> LibraryId {
        LibraryId::new(next(&self.sequences.library))
    }

    async fn add_library(&mut self, library: Library) -> Result<()> {
        tracing::info!(id = %library.id(), name = library.name(), "adding library");
        if self.library_exists(library.id()).await {
            return Err(DbError::already_exists("library", library.id()));
        }
        self.staged_libraries.insert(library.id(), Some(library));
        Ok(())
    }

    async fn get_library(&self, id: LibraryId) -> Result<Option<Library>> {
        tracing::debug!(%id, "fetching library");
        let tables = self.tables.read().await;
        self.observe_library(&tables, id);
        if let Some(staged) = self.staged_libraries.get(&id) {
            return Ok(staged.clone());
        }
        Ok(tables.libraries.get(&id).cloned())
    }

    async fn get_libraries(&self) -> Result<Vec<Library>> {
        tracing::debug!("fetching all libraries");
        let tables = self.tables.read().await;
        Ok(merged(&tables.libraries, &self.staged_libraries)
            .cloned()
            .collect())
    }

    async fn edit_library(&mut self, library: Library) -> Result<()> {
        tracing::info!(id = %library.id(), "editing library");
        if !self.library_exists(library.id()).await {
            return Err(DbError::missing("library", library.id()));
        }
        self.staged_libraries.insert(library.id(), Some(library));
        Ok(())
    }

    async fn delete_library(&mut self, id: LibraryId) -> Result<()> {
        tracing::info!(%id, "deleting library");
        if !self.library_exists(id).await {
            return Err(DbError::missing("library", id));
        }
        self.staged_libraries.insert(id, None);
        Ok(())
    }
}

#[async_trait]
impl BookRepository for MemorySession {
    fn next_book_id(&self) -> BookId {
        BookId::new(next(&self.sequences.book))
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>> {
        tracing::debug!(%id, "fetching book");
        let tables = self.tables.read().await;
        let book = merged(&tables.libraries, &self.staged_libraries)
            .find_map(|library| library.book_by_id(id).cloned());
        Ok(book)
    }

    async fn get_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        tracing::debug!(isbn, "fetching book by ISBN");
        let tables = self.tables.read().await;
        let book = merged(&tables.libraries, &self.staged_libraries)
            .find_map(|library| library.book(isbn).cloned());
        Ok(book)
    }

    async fn get_books(&self) -> Result<Vec<Book>> {
        tracing::debug!("fetching all books");
        let tables = self.tables.read().await;
        Ok(merged(&tables.libraries, &self.staged_libraries)
            .flat_map(|library| library.books())
            .cloned()
            .collect())
    }

    async fn search_books(&self, keyword: &str) -> Result<Vec<Book>> {
        tracing::debug!(keyword, "searching books");
        let tables = self.tables.read().await;
        Ok(merged(&tables.libraries, &self.staged_libraries)
            .flat_map(|library| library.search_books(keyword))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PatronRepository for MemorySession {
    fn next_patron_id(&self) -> PatronId {
        PatronId::new(next(&self.sequences.patron))
    }

    async fn add_patron(&mut self, patron: Patron) -> Result<()> {
        tracing::info!(id = %patron.id(), "adding patron");
        if self.patron_exists(patron.id()).await {
            return Err(DbError::already_exists("patron", patron.id()));
        }
        self.staged_patrons.insert(patron.id(), Some(patron));
        Ok(())
    }

    async fn get_patron(&self, id: PatronId) -> Result<Option<Patron>> {
        tracing::debug!(%id, "fetching patron");
        let tables = self.tables.read().await;
        self.observe_patron(&tables, id);
        if let Some(staged) = self.staged_patrons.get(&id) {
            return Ok(staged.clone());
        }
        Ok(tables.patrons.get(&id).cloned())
    }

    async fn get_patrons(&self) -> Result<Vec<Patron>> {
        tracing::debug!("fetching all patrons");
        let tables = self.tables.read().await;
        Ok(merged(&tables.patrons, &self.staged_patrons)
            .cloned()
            .collect())
    }

    async fn edit_patron(&mut self, patron: Patron) -> Result<()> {
        tracing::info!(id = %patron.id(), "editing patron");
        if !self.patron_exists(patron.id()).await {
            return Err(DbError::missing("patron", patron.id()));
        }
        self.staged_patrons.insert(patron.id(), Some(patron));
        Ok(())
    }

    async fn delete_patron(&mut self, id: PatronId) -> Result<()> {
        tracing::info!(%id, "deleting patron");
        if !self.patron_exists(id).await {
            return Err(DbError::missing("patron", id));
        }
        self.staged_patrons.insert(id, None);
        Ok(())
    }
}
