//! Patron commands and queries.

use lms_db::{BookRepository, Database, PatronRepository, Session};
use lms_domain::{DomainError, Patron, PatronId, StateViolation};

use super::models::{CreatePatron, EditPatron, PatronDto};
use crate::error::{ServiceError, ServiceResult};
use crate::modules::books::models::BookDto;
use crate::validation::Validate;

#[tracing::instrument(skip_all)]
pub async fn create_patron<D: Database>(db: &D, cmd: CreatePatron) -> ServiceResult<PatronId> {
    cmd.validate()?;

    let mut session = db.begin().await?;
    let patron = Patron::new(session.next_patron_id(), cmd.name);
    let id = patron.id();
    session.add_patron(patron).await?;
    session.commit().await?;

    tracing::info!(patron_id = %id, "patron created");
    Ok(id)
}

#[tracing::instrument(skip(db, cmd))]
pub async fn edit_patron<D: Database>(db: &D, id: u64, cmd: EditPatron) -> ServiceResult<()> {
    if id != cmd.id {
        return Err(ServiceError::IdMismatch {
            route: id,
            body: cmd.id,
        });
    }
    cmd.validate()?;

    let mut session = db.begin().await?;
    let mut patron = load(&session, PatronId::new(id)).await?;
    patron.update_name(cmd.name);
    session.edit_patron(patron).await?;
    session.commit().await?;

    tracing::info!(patron_id = id, "patron renamed");
    Ok(())
}

/// Refused while the patron still holds books.
#[tracing::instrument(skip(db))]
pub async fn delete_patron<D: Database>(db: &D, id: u64) -> ServiceResult<()> {
    let mut session = db.begin().await?;
    let patron = load(&session, PatronId::new(id)).await?;
    if patron.has_checkouts() {
        return Err(DomainError::from(StateViolation::PatronHasCheckouts).into());
    }
    session.delete_patron(patron.id()).await?;
    session.commit().await?;

    tracing::info!(patron_id = id, "patron deleted");
    Ok(())
}

pub async fn get_patrons<D: Database>(db: &D) -> ServiceResult<Vec<PatronDto>> {
    let session = db.begin().await?;
    let mut dtos = Vec::new();
    for patron in session.get_patrons().await? {
        dtos.push(to_dto(&session, &patron).await?);
    }
    Ok(dtos)
}

pub async fn get_patron<D: Database>(db: &D, id: u64) -> ServiceResult<PatronDto> {
    let session = db.begin().await?;
    let patron = load(&session, PatronId::new(id)).await?;
    to_dto(&session, &patron).await
}

pub(crate) async fn load<S: PatronRepository>(session: &S, id: PatronId) -> ServiceResult<Patron> {
    session
        .get_patron(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("patron", id))
}

/// Resolves the patron's book ids against the current library contents.
async fn to_dto<S: BookRepository>(session: &S, patron: &Patron) -> ServiceResult<PatronDto> {
    let mut checked_out_books = Vec::new();
    for book_id in patron.checked_out_books() {
        match session.get_book(book_id).await? {
            Some(book) => checked_out_books.push(BookDto::from(book)),
            None => tracing::warn!(patron_id = %patron.id(), %book_id, "checked-out book is gone"),
        }
    }
    Ok(PatronDto {
        id: patron.id().get(),
        name: patron.name().to_string(),
        checked_out_books,
    })
}
