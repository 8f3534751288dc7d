//! Library commands and queries.

use lms_db::{Database, LibraryRepository, Session};
use lms_domain::{DomainError, Library, LibraryId, StateViolation};

use super::models::{CreateLibrary, EditLibrary, LibraryDto};
use crate::error::{ServiceError, ServiceResult};
use crate::modules::books::models::BookDto;
use crate::validation::Validate;

#[tracing::instrument(skip_all)]
pub async fn create_library<D: Database>(db: &D, cmd: CreateLibrary) -> ServiceResult<LibraryId> {
    cmd.validate()?;

    let mut session = db.begin().await?;
    let library = Library::new(session.next_library_id(), cmd.name);
    let id = library.id();
    session.add_library(library).await?;
    session.commit().await?;

    tracing::info!(library_id = %id, "library created");
    Ok(id)
}

#[tracing::instrument(skip(db, cmd))]
pub async fn edit_library<D: Database>(db: &D, id: u64, cmd: EditLibrary) -> ServiceResult<()> {
    if id != cmd.id {
        return Err(ServiceError::IdMismatch {
            route: id,
            body: cmd.id,
        });
    }
    cmd.validate()?;

    let mut session = db.begin().await?;
    let mut library = load(&session, LibraryId::new(id)).await?;
    library.update_name(cmd.name);
    session.edit_library(library).await?;
    session.commit().await?;

    tracing::info!(library_id = id, "library renamed");
    Ok(())
}

/// Refused while any of the library's books is checked out, so no patron is
/// left holding a book that no longer exists.
#[tracing::instrument(skip(db))]
pub async fn delete_library<D: Database>(db: &D, id: u64) -> ServiceResult<()> {
    let mut session = db.begin().await?;
    let library = load(&session, LibraryId::new(id)).await?;
    if library.has_checkouts() {
        return Err(DomainError::from(StateViolation::LibraryHasCheckouts).into());
    }
    session.delete_library(library.id()).await?;
    session.commit().await?;

    tracing::info!(library_id = id, books = library.book_count(), "library deleted");
    Ok(())
}

pub async fn get_libraries<D: Database>(db: &D) -> ServiceResult<Vec<LibraryDto>> {
    let session = db.begin().await?;
    let libraries = session.get_libraries().await?;
    Ok(libraries.iter().map(LibraryDto::from).collect())
}

pub async fn get_library<D: Database>(db: &D, id: u64) -> ServiceResult<LibraryDto> {
    let session = db.begin().await?;
    let library = load(&session, LibraryId::new(id)).await?;
    Ok(LibraryDto::from(&library))
}

/// Books of one library matching `keyword` in title, author or genre.
pub async fn search_library_books<D: Database>(
    db: &D,
    id: u64,
    keyword: &str,
) -> ServiceResult<Vec<BookDto>> {
    let session = db.begin().await?;
    let library = load(&session, LibraryId::new(id)).await?;
    Ok(library.search_books(keyword).map(BookDto::from).collect())
}

pub(crate) async fn load<S: LibraryRepository>(session: &S, id: LibraryId) -> ServiceResult<Library> {
    session
        .get_library(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("library", id))
}

#[cfg(test)]
mod tests {
    use lms_db::MemoryDatabase;

    use super::*;
    use crate::modules::books::handlers::{checkout_book, create_book};
    use crate::modules::books::models::{BookLoan, CreateBook};
    use crate::modules::patrons::handlers::create_patron;
    use crate::modules::patrons::models::CreatePatron;

    async fn library(db: &MemoryDatabase, name: &str) -> u64 {
        create_library(db, CreateLibrary { name: name.into() })
            .await
            .unwrap()
            .get()
    }

    async fn book(db: &MemoryDatabase, library_id: u64, title: &str, isbn: &str) {
        create_book(
            db,
            CreateBook {
                title: title.into(),
                author: "Author".into(),
                genre: "Genre".into(),
                isbn: isbn.into(),
                library_id,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn create_then_list() {
        let db = MemoryDatabase::new();
        let id = library(&db, "Central Library").await;

        let libraries = get_libraries(&db).await.unwrap();
        assert_eq!(
            libraries,
            vec![LibraryDto {
                id,
                name: "Central Library".into()
            }]
        );
        assert_eq!(get_library(&db, id).await.unwrap().name, "Central Library");
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_write() {
        let db = MemoryDatabase::new();
        let err = create_library(&db, CreateLibrary { name: "".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(db.stats().await.unwrap().libraries, 0);
    }

    #[tokio::test]
    async fn edit_checks_route_id_and_existence() {
        let db = MemoryDatabase::new();
        let id = library(&db, "Westside").await;

        let mismatch = edit_library(
            &db,
            id,
            EditLibrary {
                id: id + 1,
                name: "Renamed".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(mismatch, ServiceError::IdMismatch { .. }));

        let missing = edit_library(
            &db,
            99,
            EditLibrary {
                id: 99,
                name: "Renamed".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(missing, ServiceError::NotFound { entity: "library", .. }));

        edit_library(
            &db,
            id,
            EditLibrary {
                id,
                name: "Westside Library".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(get_library(&db, id).await.unwrap().name, "Westside Library");
    }

    #[tokio::test]
    async fn search_is_scoped_to_one_library() {
        let db = MemoryDatabase::new();
        let central = library(&db, "Central").await;
        let east = library(&db, "East").await;
        book(&db, central, "Rust in Action", "111").await;
        book(&db, central, "Cooking", "222").await;
        book(&db, east, "Rust for Rustaceans", "333").await;

        let found = search_library_books(&db, central, "rust").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].isbn, "111");

        let all = search_library_books(&db, central, "").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn delete_refused_while_books_are_out() {
        let db = MemoryDatabase::new();
        let id = library(&db, "Central").await;
        book(&db, id, "Dune", "444").await;
        let patron = create_patron(&db, CreatePatron { name: "Jane Smith".into() })
            .await
            .unwrap()
            .get();
        checkout_book(
            &db,
            BookLoan {
                patron_id: patron,
                library_id: id,
                isbn: "444".into(),
            },
        )
        .await
        .unwrap();

        let err = delete_library(&db, id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::InvalidState(
                StateViolation::LibraryHasCheckouts
            ))
        ));
        assert!(get_library(&db, id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_removes_library_and_its_books() {
        let db = MemoryDatabase::new();
        let id = library(&db, "Central").await;
        book(&db, id, "Dune", "444").await;

        delete_library(&db, id).await.unwrap();
        assert!(matches!(
            get_library(&db, id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert_eq!(db.stats().await.unwrap().books, 0);
    }
}
