pub mod handlers;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use lms_db::Database;
use lms_http::AppError;
use lms_kernel::{InitCtx, Module};

use self::models::{CreatePatron, EditPatron, PatronDto};
use super::books::models::BookDto;
use super::docs;
use super::{created, Created};

pub struct PatronsModule<D: Database> {
    db: Arc<D>,
}

impl<D: Database> PatronsModule<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<D: Database> Module for PatronsModule<D> {
    fn name(&self) -> &'static str {
        "patrons"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "patrons module initialized"
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
            .with_state(self.db.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = docs::path_param("id", "integer");
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List patrons with the books they hold",
                        "tags": ["Patrons"],
                        "responses": {
                            "200": docs::ok("All patrons", docs::array_of("PatronDto"))
                        }
                    },
                    "post": {
                        "summary": "Register a patron",
                        "tags": ["Patrons"],
                        "requestBody": docs::json_body("CreatePatron"),
                        "responses": {
                            "201": docs::ok("Patron created", docs::schema_ref("Created")),
                            "422": docs::error("Validation error")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Patrons health check",
                        "tags": ["Patrons"],
                        "responses": { "200": docs::no_content("OK") }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a patron by id",
                        "tags": ["Patrons"],
                        "parameters": [id],
                        "responses": {
                            "200": docs::ok("The patron", docs::schema_ref("PatronDto")),
                            "404": docs::error("Patron not found")
                        }
                    },
                    "put": {
                        "summary": "Rename a patron",
                        "tags": ["Patrons"],
                        "parameters": [id],
                        "requestBody": docs::json_body("EditPatron"),
                        "responses": {
                            "204": docs::no_content("Patron updated"),
                            "400": docs::error("Route and body ids differ"),
                            "404": docs::error("Patron not found"),
                            "422": docs::error("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a patron",
                        "tags": ["Patrons"],
                        "parameters": [id],
                        "responses": {
                            "204": docs::no_content("Patron deleted"),
                            "400": docs::error("Patron still holds books"),
                            "404": docs::error("Patron not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": docs::schemas([
                    docs::schema::<PatronDto>(),
                    docs::schema::<CreatePatron>(),
                    docs::schema::<EditPatron>(),
                    docs::schema::<BookDto>(),
                    docs::schema::<Created>(),
                ])
            }
        }))
    }
}

async fn health_check() -> &'static str {
    "patrons module is healthy"
}

async fn list<D: Database>(State(db): State<Arc<D>>) -> Result<Json<Vec<PatronDto>>, AppError> {
    Ok(Json(handlers::get_patrons(db.as_ref()).await?))
}

async fn fetch<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
) -> Result<Json<PatronDto>, AppError> {
    Ok(Json(handlers::get_patron(db.as_ref(), id).await?))
}

async fn create<D: Database>(
    State(db): State<Arc<D>>,
    body: Result<Json<CreatePatron>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(cmd) = body?;
    let id = handlers::create_patron(db.as_ref(), cmd).await?;
    Ok(created(format!("/api/patrons/{id}"), id.get()))
}

async fn edit<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
    body: Result<Json<EditPatron>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(cmd) = body?;
    handlers::edit_patron(db.as_ref(), id, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove<D: Database>(
    State(db): State<Arc<D>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    handlers::delete_patron(db.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_module<D: Database>(db: Arc<D>) -> Arc<dyn Module> {
    Arc::new(PatronsModule::new(db))
}
