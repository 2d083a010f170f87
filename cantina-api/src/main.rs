use std::net::SocketAddr;
use std::sync::Arc;

use cantina_api::{
    app,
    state::{AppState, AuthConfig},
};
use cantina_cart::CartEngine;
use cantina_catalog::CatalogRepository;
use cantina_order::CheckoutEngine;
use cantina_store::{Database, PgCartRepository, PgCatalogRepository, PgOrderRepository, WebhookSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cantina_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cantina_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Cantina API on port {}", config.server.port);

    let db = Database::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let catalog: Arc<dyn CatalogRepository> = Arc::new(PgCatalogRepository::new(db.pool.clone()));
    let carts = Arc::new(PgCartRepository::new(db.pool.clone()));
    let orders = Arc::new(PgOrderRepository::new(db.pool.clone()));
    let sink = Arc::new(
        WebhookSink::from_config(&config.webhook).expect("Failed to build webhook client"),
    );

    let app_state = AppState {
        cart: Arc::new(CartEngine::new(carts, catalog.clone())),
        orders: Arc::new(CheckoutEngine::new(orders, catalog.clone(), sink.clone())),
        catalog,
        sink,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
