pub mod handlers;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use lms_db::Database;
use lms_http::AppError;
use lms_kernel::{InitCtx, Module};

use self::models::{BookDto, BookLoan, CreateBook, EditBook};
use super::docs;
use super::{created, Created, SearchParams};

pub struct BooksModule<D: Database> {
    db: Arc<D>,
}

impl<D: Database> BooksModule<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<D: Database> Module for BooksModule<D> {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list::<D>).post(create::<D>))
            .route("/health", get(health_check))
            .route("/search", get(search::<D>))
            .route("/isbn/{isbn}", get(fetch_by_isbn::<D>))
            .route("/checkout", post(checkout::<D>))
            .route("/checkin", post(checkin::<D>))
            .route(
                "/{id}",
                get(fetch::<D>).put(edit::<D>).delete(remove::<D>),
            )
            .with_state(self.db.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = docs::path_param("id", "integer");
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List every book across libraries",
                        "tags": ["Books"],
                        "responses": {
                            "200": docs::ok("All books", docs::array_of("BookDto"))
                        }
                    },
                    "post": {
                        "summary": "Add a book to a library",
                        "tags": ["Books"],
                        "requestBody": docs::json_body("CreateBook"),
                        "responses": {
                            "201": docs::ok("Book created", docs::schema_ref("Created")),
                            "404": docs::error("Library not found"),
                            "409": docs::error("ISBN already used in that library"),
                            "422": docs::error("Validation error")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": { "200": docs::no_content("OK") }
                    }
                },
                "/search": {
                    "get": {
                        "summary": "Search books in every library",
                        "tags": ["Books"],
                        "parameters": [docs::keyword_param()],
                        "responses": {
                            "200": docs::ok("Matching books", docs::array_of("BookDto"))
                        }
                    }
                },
                "/isbn/{isbn}": {
                    "get": {
                        "summary": "Get a book by ISBN",
                        "tags": ["Books"],
                        "parameters": [docs::path_param("isbn", "string")],
                        "responses": {
                            "200": docs::ok("The book", docs::schema_ref("BookDto")),
                            "404": docs::error("Book not found")
                        }
                    }
                },
                "/checkout": {
                    "post": {
                        "summary": "Check a book out to a patron",
                        "tags": ["Books"],
                        "requestBody": docs::json_body("BookLoan"),
                        "responses": {
                            "204": docs::no_content("Book checked out"),
                            "400": docs::error("Book is already checked out"),
                            "404": docs::error("Library, patron or book not found"),
                            "422": docs::error("Validation error")
                        }
                    }
                },
                "/checkin": {
                    "post": {
                        "summary": "Return a book from a patron",
                        "tags": ["Books"],
                        "requestBody": docs::json_body("BookLoan"),
                        "responses": {
                            "204": docs::no_content("Book checked in"),
                            "400": docs::error("Book was not checked out by this patron"),
                            "404": docs::error("Library, patron or book not found"),
                            "422": docs::error("Validation error")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [id],
                        "responses": {
                            "200": docs::ok("The book", docs::schema_ref("BookDto")),
                            "404": docs::error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Edit a book",
                        "tags": ["Books"],
                        "parameters": [id],
                        "requestBody": docs::json_body("EditBook"),
                        "responses": {
                            "204": docs::no_content("Book updated"),
                            "400": docs::error("Route and body ids differ"),
                            "404": docs::error("Library or book not found"),
                            "409": docs::error("New ISBN already used in that library"),
                            "422": docs::error("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id],
                        "responses": {
                            "204": docs::no_content("Book deleted"),
                            "400": docs::error("Book is checked out"),
                            "404": docs::error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": docs::schemas([
                    docs::schema::<BookDto>(),
                    docs::schema::<CreateBook>(),
                    docs::schema::<EditBook>(),
                    docs::schema::<BookLoan>(),
                    docs::schema::<Created>(),
                ])
            }
        }))
    }
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list<D: Database>(State(db): State<Arc<D>>) -> Result<Json<Vec<BookDto>>, AppError> {
    Ok(Json(handlers::get_books(db.as_ref()).await?))
}

async fn fetch<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
) -> Result<Json<BookDto>, AppError> {
    Ok(Json(handlers::get_book(db.as_ref(), id).await?))
}

async fn fetch_by_isbn<D: Database>(
    State(db): State<Arc<D>>,
    Path(isbn): Path<String>,
) -> Result<Json<BookDto>, AppError> {
    Ok(Json(handlers::get_book_by_isbn(db.as_ref(), &isbn).await?))
}

async fn search<D: Database>(
    State(db): State<Arc<D>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<BookDto>>, AppError> {
    Ok(Json(
        handlers::search_books(db.as_ref(), params.keyword()).await?,
    ))
}

async fn create<D: Database>(
    State(db): State<Arc<D>>,
    body: Result<Json<CreateBook>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(cmd) = body?;
    let id = handlers::create_book(db.as_ref(), cmd).await?;
    Ok(created(format!("/api/books/{id}"), id.get()))
}

async fn edit<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
    body: Result<Json<EditBook>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(cmd) = body?;
    handlers::edit_book(db.as_ref(), id, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    handlers::delete_book(db.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn checkout<D: Database>(
    State(db): State<Arc<D>>,
    body: Result<Json<BookLoan>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(loan) = body?;
    handlers::checkout_book(db.as_ref(), loan).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn checkin<D: Database>(
    State(db): State<Arc<D>>,
    body: Result<Json<BookLoan>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(loan) = body?;
    handlers::checkin_book(db.as_ref(), loan).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_module<D: Database>(db: Arc<D>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(db))
}
