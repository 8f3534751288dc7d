pub mod books;
pub(crate) mod docs;
pub mod libraries;
pub mod patrons;

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use lms_db::Database;
use lms_kernel::ModuleRegistry;

/// Register the libraries, books and patrons modules, all sharing `db`.
pub fn register_all<D: Database>(registry: &mut ModuleRegistry, db: Arc<D>) -> anyhow::Result<()> {
    registry.register_custom(libraries::create_module(db.clone()))?;
    registry.register_custom(books::create_module(db.clone()))?;
    registry.register_custom(patrons::create_module(db))?;
    Ok(())
}

/// Body of a `201 Created` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Created {
    pub id: u64,
}

pub(crate) fn created(location: String, id: u64) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(Created { id }),
    )
}

/// `?keyword=` on search endpoints. Absent means match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
}

impl SearchParams {
    pub fn keyword(&self) -> &str {
        self.keyword.as_deref().unwrap_or_default()
    }
}
