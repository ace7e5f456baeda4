pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod validation;
pub mod words;

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        request::Parts as RequestParts,
        HeaderValue, Method, Uri,
    },
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, InMemoryUserRepository, TokenService, UserStore};
use error::ApiError;
use words::{InMemoryWordRepository, WordStore};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::me_handler,
        auth::handlers::update_me_handler,
        words::handlers::random_word,
        words::handlers::list_words,
        words::handlers::get_word,
        words::handlers::create_word,
        words::handlers::update_word,
        words::handlers::delete_word,
    ),
    components(schemas(
        HealthResponse,
        error::ErrorResponse,
        auth::Role,
        auth::UserResponse,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::UpdateProfileRequest,
        auth::AuthResponse,
        words::Category,
        words::Word,
        words::CreateWord,
        words::UpdateWord,
        words::WordPage,
        words::RandomWord,
        words::WordMessage,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and profile endpoints"),
        (name = "words", description = "Word collection endpoints"),
        (name = "system", description = "Service status")
    ),
    info(
        title = "Wordsite API",
        version = "1.0.0",
        description = "REST API with JWT authentication and a word collection"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub words: Arc<dyn WordStore>,
    pub tokens: Arc<TokenService>,
    pub environment: String,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        words: Arc<dyn WordStore>,
        tokens: TokenService,
        environment: impl Into<String>,
    ) -> Self {
        let tokens = Arc::new(tokens);
        Self {
            auth_service: Arc::new(AuthService::new(users, tokens.clone())),
            words,
            tokens,
            environment: environment.into(),
        }
    }

    /// State backed by process-local stores
    pub fn in_memory(tokens: TokenService, environment: impl Into<String>) -> Self {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryWordRepository::new()),
            tokens,
            environment,
        )
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub environment: String,
}

/// Handler for GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "system"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        environment: state.environment.clone(),
    })
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allowed = allowed_origins.to_vec();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &RequestParts| {
                let allowed_origin = origin
                    .to_str()
                    .map(|origin| config::is_allowed_origin(origin, &allowed))
                    .unwrap_or(false);
                if !allowed_origin {
                    tracing::debug!("Rejected CORS origin: {:?}", origin);
                }
                allowed_origin
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
        .allow_credentials(true)
}

/// Creates and configures the application router
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route(
            "/api/auth/me",
            get(auth::me_handler).put(auth::update_me_handler),
        )
        .route("/api/words/random", get(words::random_word))
        .route(
            "/api/words",
            get(words::list_words).post(words::create_word),
        )
        .route(
            "/api/words/:id",
            get(words::get_word)
                .put(words::update_word)
                .delete(words::delete_word),
        )
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(allowed_origins)),
        )
        .with_state(state)
}
