//! Router assembly and OpenAPI aggregation.

use std::time::Duration;

use axum::{extract::Request, http::HeaderValue, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use lms_kernel::{ModuleKind, ModuleRegistry};

const API_TITLE: &str = "LMS API";
const API_VERSION: &str = "1.0.0";

/// Builder for the service router. Layers only wrap routes added before them,
/// so add routes first.
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    pub fn merge(mut self, other: Router) -> Self {
        self.router = self.router.merge(other);
        self
    }

    /// Mount a module's router under `/api/{module_name}`.
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let api_path = format!("/api/{module_name}");
        self.router = self.router.nest(&api_path, module_router);
        self
    }

    /// Mount the routes of every custom module. Core modules expose none.
    pub fn mount_modules(mut self, registry: &ModuleRegistry) -> Self {
        for module in registry.modules() {
            if registry.kind_of(module.name()) != Some(ModuleKind::Custom) {
                continue;
            }
            tracing::info!(module = module.name(), "mounting routes under /api/{}", module.name());
            self = self.mount_module(module.name(), module.routes());
        }
        self
    }

    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Stamp each request with a UUIDv7 `x-request-id` and echo it back.
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Serve the merged document at `/docs/openapi.json` and Swagger UI at
    /// `/swagger-ui`.
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let document = openapi_document(registry);

        let openapi: utoipa::openapi::OpenApi = match serde_json::from_value(document.clone()) {
            Ok(openapi) => openapi,
            Err(err) => {
                tracing::warn!(error = %err, "merged OpenAPI document rejected by Swagger UI");
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title(API_TITLE)
                            .version(API_VERSION)
                            .build(),
                    )
                    .build()
            }
        };

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi),
        );
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(document.clone()) }),
        );
        self
    }

    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the `paths` and `components.schemas` fragments of every module into
/// one document. Module paths are prefixed with `/api/{module}`.
pub fn openapi_document(registry: &ModuleRegistry) -> Value {
    let mut document = json!({
        "openapi": "3.1.0",
        "info": {
            "title": API_TITLE,
            "version": API_VERSION,
            "description": "Libraries, books, patrons and checkouts"
        },
        "paths": {},
        "components": { "schemas": {} }
    });

    document["components"]["schemas"]["ErrorResponse"] = json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": { "type": "array", "items": {} },
                    "trace_id": { "type": "string" },
                    "timestamp": { "type": "string" }
                },
                "required": ["code", "message", "details", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    });

    document["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Aggregated module health",
            "tags": ["Health"],
            "responses": {
                "200": { "description": "Every module is healthy" },
                "503": { "description": "At least one module is failing" }
            }
        }
    });

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };

        if let Some(paths) = fragment.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                let prefixed = match path.as_str() {
                    "/" => format!("/api/{}", module.name()),
                    _ => format!("/api/{}{}", module.name(), path),
                };
                document["paths"][prefixed] = item.clone();
            }
        }

        if let Some(schemas) = fragment
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        {
            for (name, schema) in schemas {
                document["components"]["schemas"][name] = schema.clone();
            }
        }
    }

    document
}

#[derive(Clone)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
