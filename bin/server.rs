// Referral Program - Web Server
// REST API with Axum over the referral service

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use referral_program::{ClickOutcome, Error, LinkView, Product, ReferralService, Referrer};

/// Shared application state
#[derive(Clone)]
struct AppState {
    service: Arc<Mutex<ReferralService>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Map service errors onto HTTP statuses: NotFound → 404, Forbidden → 403
fn error_response(err: Error) -> Response {
    let status = match err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Forbidden(_) => StatusCode::FORBIDDEN,
    };
    (status, Json(ApiResponse::<()>::err(err.to_string()))).into_response()
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Deserialize)]
struct ReferrerIn {
    name: String,
    referral_percentage: f64,
}

#[derive(Deserialize)]
struct ProductIn {
    name: String,
    price: f64,
}

#[derive(Deserialize)]
struct ReferralLinkIn {
    referrer_id: String,
    product_id: String,
    #[serde(default)]
    level: u32,
    #[serde(default)]
    children_ids: Vec<String>,
}

#[derive(Serialize)]
struct CommissionResponse {
    commission: f64,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /referrers - Create a referrer
async fn create_referrer(
    State(state): State<AppState>,
    Json(body): Json<ReferrerIn>,
) -> impl IntoResponse {
    let service = state.service.lock().unwrap();
    let referrer = service.create_referrer(&body.name, body.referral_percentage);

    (StatusCode::CREATED, Json(ApiResponse::ok(referrer)))
}

/// POST /products - Create a product
async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<ProductIn>,
) -> impl IntoResponse {
    let service = state.service.lock().unwrap();
    let product = service.create_product(&body.name, body.price);

    (StatusCode::CREATED, Json(ApiResponse::ok(product)))
}

/// POST /referral_links - Create a referral link
async fn create_referral_link(
    State(state): State<AppState>,
    Json(body): Json<ReferralLinkIn>,
) -> Response {
    let service = state.service.lock().unwrap();

    match service.create_referral_link(
        &body.referrer_id,
        &body.product_id,
        body.level,
        &body.children_ids,
    ) {
        Ok(view) => (StatusCode::CREATED, Json(ApiResponse::ok(view))).into_response(),
        Err(e) => error_response(e),
    }
}

/// PATCH /referral_links/:id/activate - Mark a link active
async fn activate_link(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let service = state.service.lock().unwrap();

    match service.activate_link(&id) {
        Ok(()) => Json(ApiResponse::ok("Referral link activated")).into_response(),
        Err(e) => error_response(e),
    }
}

/// PATCH /referral_links/:id/deactivate - Mark a link inactive
async fn deactivate_link(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let service = state.service.lock().unwrap();

    match service.deactivate_link(&id) {
        Ok(()) => Json(ApiResponse::ok("Referral link deactivated")).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /referral_links/:id - Flattened link view
async fn get_link(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let service = state.service.lock().unwrap();

    match service.link_view(&id) {
        Ok(view) => Json(ApiResponse::ok(view)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /referral_links/:id/commission - Subtree commission for an active link
async fn get_commission(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let service = state.service.lock().unwrap();

    match service.get_commission(&id) {
        Ok(commission) => Json(ApiResponse::ok(CommissionResponse { commission })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /referral_links/:id/click - Handle a click on an active link
async fn handle_click(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let service = state.service.lock().unwrap();

    match service.handle_click(&id) {
        Ok(outcome) => Json(ApiResponse::<ClickOutcome>::ok(outcome)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /referrers - List all referrers
async fn list_referrers(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.service.lock().unwrap();
    let referrers: Vec<Referrer> = service.all_referrers();

    Json(ApiResponse::ok(referrers))
}

/// GET /products - List all products
async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.service.lock().unwrap();
    let products: Vec<Product> = service.all_products();

    Json(ApiResponse::ok(products))
}

/// GET /referral_links - List all links as flattened views
async fn list_links(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.service.lock().unwrap();
    let links: Vec<LinkView> = service.all_links();

    Json(ApiResponse::ok(links))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Referral Program - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Create shared state with an empty store
    let state = AppState {
        service: Arc::new(Mutex::new(ReferralService::new())),
    };

    // Build routes
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/referrers", post(create_referrer).get(list_referrers))
        .route("/products", post(create_product).get(list_products))
        .route("/referral_links", post(create_referral_link).get(list_links))
        .route("/referral_links/:id", get(get_link))
        .route("/referral_links/:id/activate", patch(activate_link))
        .route("/referral_links/:id/deactivate", patch(deactivate_link))
        .route("/referral_links/:id/commission", get(get_commission))
        .route("/referral_links/:id/click", get(handle_click))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   POST http://localhost:3000/referrers");
    println!("   POST http://localhost:3000/products");
    println!("   POST http://localhost:3000/referral_links");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
