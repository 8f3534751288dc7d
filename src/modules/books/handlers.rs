//! Book commands and queries. Books are written through their library.

use lms_db::{BookRepository, Database, LibraryRepository, PatronRepository, Session};
use lms_domain::{Book, BookId, DomainError, LibraryId, PatronId, StateViolation};

use super::models::{BookDto, BookLoan, CreateBook, EditBook};
use crate::error::{ServiceError, ServiceResult};
use crate::modules::libraries::handlers::load as load_library;
use crate::modules::patrons::handlers::load as load_patron;
use crate::validation::Validate;

#[tracing::instrument(skip_all, fields(library_id = cmd.library_id, isbn = %cmd.isbn))]
pub async fn create_book<D: Database>(db: &D, cmd: CreateBook) -> ServiceResult<BookId> {
    cmd.validate()?;

    let mut session = db.begin().await?;
    let mut library = load_library(&session, LibraryId::new(cmd.library_id)).await?;
    let book = Book::new(
        session.next_book_id(),
        cmd.title,
        cmd.author,
        cmd.genre,
        cmd.isbn,
        library.id(),
    );
    let id = book.id();
    library.add_book(book)?;
    session.edit_library(library).await?;
    session.commit().await?;

    tracing::info!(book_id = %id, "book created");
    Ok(id)
}

#[tracing::instrument(skip(db, cmd))]
pub async fn edit_book<D: Database>(db: &D, id: u64, cmd: EditBook) -> ServiceResult<()> {
    if id != cmd.book_id {
        return Err(ServiceError::IdMismatch {
            route: id,
            body: cmd.book_id,
        });
    }
    cmd.validate()?;

    let mut session = db.begin().await?;
    let mut library = load_library(&session, LibraryId::new(cmd.library_id)).await?;
    library.edit_book(
        BookId::new(id),
        &cmd.title,
        &cmd.author,
        &cmd.genre,
        &cmd.isbn,
    )?;
    session.edit_library(library).await?;
    session.commit().await?;

    tracing::info!(book_id = id, "book edited");
    Ok(())
}

/// Refused while the book is checked out.
#[tracing::instrument(skip(db))]
pub async fn delete_book<D: Database>(db: &D, id: u64) -> ServiceResult<()> {
    let mut session = db.begin().await?;
    let book = session
        .get_book(BookId::new(id))
        .await?
        .ok_or_else(|| ServiceError::not_found("book", id))?;
    if !book.is_available() {
        return Err(DomainError::from(StateViolation::AlreadyCheckedOut).into());
    }

    let mut library = load_library(&session, book.library_id()).await?;
    library.remove_book(book.isbn())?;
    session.edit_library(library).await?;
    session.commit().await?;

    tracing::info!(book_id = id, library_id = %book.library_id(), "book deleted");
    Ok(())
}

#[tracing::instrument(skip_all, fields(patron_id = loan.patron_id, library_id = loan.library_id, isbn = %loan.isbn))]
pub async fn checkout_book<D: Database>(db: &D, loan: BookLoan) -> ServiceResult<()> {
    loan.validate()?;

    let mut session = db.begin().await?;
    let mut library = load_library(&session, LibraryId::new(loan.library_id)).await?;
    let mut patron = load_patron(&session, PatronId::new(loan.patron_id)).await?;
    library.checkout_book(&loan.isbn, &mut patron)?;
    session.edit_library(library).await?;
    session.edit_patron(patron).await?;
    session.commit().await?;

    tracing::info!("book checked out");
    Ok(())
}

#[tracing::instrument(skip_all, fields(patron_id = loan.patron_id, library_id = loan.library_id, isbn = %loan.isbn))]
pub async fn checkin_book<D: Database>(db: &D, loan: BookLoan) -> ServiceResult<()> {
    loan.validate()?;

    let mut session = db.begin().await?;
    let mut library = load_library(&session, LibraryId::new(loan.library_id)).await?;
    let mut patron = load_patron(&session, PatronId::new(loan.patron_id)).await?;
    library.return_book(&loan.isbn, &mut patron)?;
    session.edit_library(library).await?;
    session.edit_patron(patron).await?;
    session.commit().await?;

    tracing::info!("book checked in");
    Ok(())
}

pub async fn get_books<D: Database>(db: &D) -> ServiceResult<Vec<BookDto>> {
    let session = db.begin().await?;
    let books = session.get_books().await?;
    Ok(books.into_iter().map(BookDto::from).collect())
}

pub async fn get_book<D: Database>(db: &D, id: u64) -> ServiceResult<BookDto> {
    let session = db.begin().await?;
    session
        .get_book(BookId::new(id))
        .await?
        .map(BookDto::from)
        .ok_or_else(|| ServiceError::not_found("book", id))
}

pub async fn get_book_by_isbn<D: Database>(db: &D, isbn: &str) -> ServiceResult<BookDto> {
    let session = db.begin().await?;
    session
        .get_book_by_isbn(isbn)
        .await?
        .map(BookDto::from)
        .ok_or_else(|| ServiceError::NotFound {
            entity: "book",
            id: format!("ISBN {isbn}"),
        })
}

pub async fn search_books<D: Database>(db: &D, keyword: &str) -> ServiceResult<Vec<BookDto>> {
    let session = db.begin().await?;
    let books = session.search_books(keyword).await?;
    Ok(books.into_iter().map(BookDto::from).collect())
}

#[cfg(test)]
mod tests {
    use lms_db::MemoryDatabase;

    use super::*;
    use crate::modules::libraries::handlers::create_library;
    use crate::modules::libraries::models::CreateLibrary;
    use crate::modules::patrons::handlers::{create_patron, get_patron};
    use crate::modules::patrons::models::CreatePatron;

    struct Fixture {
        db: MemoryDatabase,
        library: u64,
        patron: u64,
    }

    async fn fixture() -> Fixture {
        let db = MemoryDatabase::new();
        let library = create_library(&db, CreateLibrary { name: "Central Library".into() })
            .await
            .unwrap()
            .get();
        let patron = create_patron(&db, CreatePatron { name: "John Doe".into() })
            .await
            .unwrap()
            .get();
        Fixture {
            db,
            library,
            patron,
        }
    }

    fn new_book(library_id: u64, title: &str, isbn: &str) -> CreateBook {
        CreateBook {
            title: title.into(),
            author: "Ursula K. Le Guin".into(),
            genre: "Fantasy".into(),
            isbn: isbn.into(),
            library_id,
        }
    }

    fn loan(f: &Fixture, isbn: &str) -> BookLoan {
        BookLoan {
            patron_id: f.patron,
            library_id: f.library,
            isbn: isbn.into(),
        }
    }

    #[tokio::test]
    async fn create_book_in_unknown_library_is_not_found() {
        let f = fixture().await;
        let err = create_book(&f.db, new_book(42, "Lost", "000"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "library", .. }));
    }

    #[tokio::test]
    async fn duplicate_isbn_in_same_library_is_rejected() {
        let f = fixture().await;
        create_book(&f.db, new_book(f.library, "A Wizard of Earthsea", "100"))
            .await
            .unwrap();
        let err = create_book(&f.db, new_book(f.library, "Tehanu", "100"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::DuplicateKey { .. })
        ));
        assert_eq!(get_books(&f.db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lookups_by_id_isbn_and_keyword() {
        let f = fixture().await;
        let id = create_book(&f.db, new_book(f.library, "The Dispossessed", "200"))
            .await
            .unwrap();

        assert_eq!(get_book(&f.db, id.get()).await.unwrap().isbn, "200");
        assert_eq!(get_book_by_isbn(&f.db, "200").await.unwrap().id, id.get());
        assert!(matches!(
            get_book_by_isbn(&f.db, "999").await,
            Err(ServiceError::NotFound { .. })
        ));
        assert_eq!(search_books(&f.db, "le guin").await.unwrap().len(), 1);
        assert!(search_books(&f.db, "tolstoy").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn checkout_and_checkin_round_trip() {
        let f = fixture().await;
        let id = create_book(&f.db, new_book(f.library, "The Lathe of Heaven", "300"))
            .await
            .unwrap();

        checkout_book(&f.db, loan(&f, "300")).await.unwrap();
        assert!(!get_book(&f.db, id.get()).await.unwrap().is_available);
        let patron = get_patron(&f.db, f.patron).await.unwrap();
        assert_eq!(patron.checked_out_books.len(), 1);
        assert_eq!(patron.checked_out_books[0].id, id.get());

        let again = checkout_book(&f.db, loan(&f, "300")).await.unwrap_err();
        assert!(matches!(
            again,
            ServiceError::Domain(DomainError::InvalidState(
                StateViolation::AlreadyCheckedOut
            ))
        ));

        checkin_book(&f.db, loan(&f, "300")).await.unwrap();
        assert!(get_book(&f.db, id.get()).await.unwrap().is_available);
        assert!(get_patron(&f.db, f.patron)
            .await
            .unwrap()
            .checked_out_books
            .is_empty());
    }

    #[tokio::test]
    async fn checkin_by_another_patron_is_refused() {
        let f = fixture().await;
        create_book(&f.db, new_book(f.library, "Always Coming Home", "400"))
            .await
            .unwrap();
        checkout_book(&f.db, loan(&f, "400")).await.unwrap();

        let other = create_patron(&f.db, CreatePatron { name: "Bob Brown".into() })
            .await
            .unwrap()
            .get();
        let err = checkin_book(
            &f.db,
            BookLoan {
                patron_id: other,
                ..loan(&f, "400")
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::InvalidState(
                StateViolation::NotCheckedOutByPatron
            ))
        ));
        assert_eq!(f.db.stats().await.unwrap().checked_out_books, 1);
    }

    #[tokio::test]
    async fn checkout_of_unknown_isbn_or_patron() {
        let f = fixture().await;
        let err = checkout_book(&f.db, loan(&f, "nope")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));

        create_book(&f.db, new_book(f.library, "Lavinia", "500"))
            .await
            .unwrap();
        let err = checkout_book(
            &f.db,
            BookLoan {
                patron_id: 77,
                ..loan(&f, "500")
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "patron", .. }));
    }

    #[tokio::test]
    async fn edit_rekeys_isbn_and_keeps_checkout() {
        let f = fixture().await;
        let id = create_book(&f.db, new_book(f.library, "Old Title", "600"))
            .await
            .unwrap();
        checkout_book(&f.db, loan(&f, "600")).await.unwrap();

        edit_book(
            &f.db,
            id.get(),
            EditBook {
                library_id: f.library,
                book_id: id.get(),
                title: "New Title".into(),
                author: "Someone".into(),
                genre: "Drama".into(),
                isbn: "601".into(),
            },
        )
        .await
        .unwrap();

        let book = get_book(&f.db, id.get()).await.unwrap();
        assert_eq!(book.title, "New Title");
        assert_eq!(book.isbn, "601");
        assert!(!book.is_available);
        assert!(get_book_by_isbn(&f.db, "600").await.is_err());

        checkin_book(&f.db, loan(&f, "601")).await.unwrap();
    }

    #[tokio::test]
    async fn edit_with_mismatched_route_id() {
        let f = fixture().await;
        let err = edit_book(
            &f.db,
            1,
            EditBook {
                library_id: f.library,
                book_id: 2,
                title: "T".into(),
                author: "A".into(),
                genre: "G".into(),
                isbn: "1".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::IdMismatch { route: 1, body: 2 }
        ));
    }

    #[tokio::test]
    async fn delete_refused_while_checked_out() {
        let f = fixture().await;
        let id = create_book(&f.db, new_book(f.library, "Voices", "700"))
            .await
            .unwrap();
        checkout_book(&f.db, loan(&f, "700")).await.unwrap();

        assert!(delete_book(&f.db, id.get()).await.is_err());
        checkin_book(&f.db, loan(&f, "700")).await.unwrap();
        delete_book(&f.db, id.get()).await.unwrap();
        assert!(matches!(
            get_book(&f.db, id.get()).await,
            Err(ServiceError::NotFound { entity: "book", .. })
        ));
        assert!(matches!(
            delete_book(&f.db, id.get()).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
