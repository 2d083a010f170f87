use axum::{
    http::Method,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod cart;
pub mod error;
pub mod menus;
pub mod middleware;
pub mod orders;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let user_routes = Router::new()
        .route("/v1/cart", get(cart::read_cart).delete(cart::clear_cart))
        .route("/v1/cart/items", post(cart::add_items))
        .route(
            "/v1/cart/lines/{line_id}",
            patch(cart::set_quantity).delete(cart::remove_line),
        )
        .route("/v1/cart/checkout", post(orders::checkout))
        .route(
            "/v1/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route("/v1/orders/{id}", get(orders::get_order))
        .route("/v1/menus", get(menus::list_menus))
        .route("/v1/menus/{id}", get(menus::get_menu))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::customer_auth_middleware,
        ));

    let staff_routes = Router::new()
        .route(
            "/v1/admin/menus",
            get(menus::list_all_menus).post(menus::create_menu),
        )
        .route(
            "/v1/admin/menus/{id}",
            patch(menus::update_menu).delete(menus::delete_menu),
        )
        .route("/v1/admin/orders", get(orders::list_all_orders))
        .route("/v1/admin/orders/{id}/status", patch(orders::update_status))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::staff_auth_middleware,
        ));

    Router::new()
        .merge(auth::routes())
        .merge(user_routes)
        .merge(staff_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
