pub mod handlers;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use lms_db::Database;
use lms_http::AppError;
use lms_kernel::{InitCtx, Module};

use self::models::{CreateLibrary, EditLibrary, LibraryDto};
use super::books::models::BookDto;
use super::docs;
use super::{created, Created, SearchParams};

pub struct LibrariesModule<D: Database> {
    db: Arc<D>,
}

impl<D: Database> LibrariesModule<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<D: Database> Module for LibrariesModule<D> {
    fn name(&self) -> &'static str {
        "libraries"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "libraries module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list::<D>).post(create::<D>))
            .route("/health", get(health_check))
            .route(
                "/{id}",
                get(fetch::<D>).put(edit::<D>).delete(remove::<D>),
            )
            .route("/{id}/books", get(search_books::<D>))
            .with_state(self.db.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = docs::path_param("id", "integer");
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List libraries",
                        "tags": ["Libraries"],
                        "responses": {
                            "200": docs::ok("All libraries", docs::array_of("LibraryDto"))
                        }
                    },
                    "post": {
                        "summary": "Create a library",
                        "tags": ["Libraries"],
                        "requestBody": docs::json_body("CreateLibrary"),
                        "responses": {
                            "201": docs::ok("Library created", docs::schema_ref("Created")),
                            "422": docs::error("Validation error")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Libraries health check",
                        "tags": ["Libraries"],
                        "responses": { "200": docs::no_content("OK") }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a library by id",
                        "tags": ["Libraries"],
                        "parameters": [id],
                        "responses": {
                            "200": docs::ok("The library", docs::schema_ref("LibraryDto")),
                            "404": docs::error("Library not found")
                        }
                    },
                    "put": {
                        "summary": "Rename a library",
                        "tags": ["Libraries"],
                        "parameters": [id],
                        "requestBody": docs::json_body("EditLibrary"),
                        "responses": {
                            "204": docs::no_content("Library updated"),
                            "400": docs::error("Route and body ids differ"),
                            "404": docs::error("Library not found"),
                            "422": docs::error("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a library and its books",
                        "tags": ["Libraries"],
                        "parameters": [id],
                        "responses": {
                            "204": docs::no_content("Library deleted"),
                            "400": docs::error("Library still has checked-out books"),
                            "404": docs::error("Library not found")
                        }
                    }
                },
                "/{id}/books": {
                    "get": {
                        "summary": "Search the books of one library",
                        "tags": ["Libraries"],
                        "parameters": [id, docs::keyword_param()],
                        "responses": {
                            "200": docs::ok("Matching books", docs::array_of("BookDto")),
                            "404": docs::error("Library not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": docs::schemas([
                    docs::schema::<LibraryDto>(),
                    docs::schema::<CreateLibrary>(),
                    docs::schema::<EditLibrary>(),
                    docs::schema::<BookDto>(),
                    docs::schema::<Created>(),
                ])
            }
        }))
    }
}

async fn health_check() -> &'static str {
    "libraries module is healthy"
}

async fn list<D: Database>(
    State(db): State<Arc<D>>,
) -> Result<Json<Vec<LibraryDto>>, AppError> {
    Ok(Json(handlers::get_libraries(db.as_ref()).await?))
}

async fn fetch<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
) -> Result<Json<LibraryDto>, AppError> {
    Ok(Json(handlers::get_library(db.as_ref(), id).await?))
}

async fn search_books<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<BookDto>>, AppError> {
    let books = handlers::search_library_books(db.as_ref(), id, params.keyword()).await?;
    Ok(Json(books))
}

async fn create<D: Database>(
    State(db): State<Arc<D>>,
    body: Result<Json<CreateLibrary>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(cmd) = body?;
    let id = handlers::create_library(db.as_ref(), cmd).await?;
    Ok(created(format!("/api/libraries/{id}"), id.get()))
}

async fn edit<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
    body: Result<Json<EditLibrary>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(cmd) = body?;
    handlers::edit_library(db.as_ref(), id, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    handlers::delete_library(db.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_module<D: Database>(db: Arc<D>) -> Arc<dyn Module> {
    Arc::new(LibrariesModule::new(db))
}
