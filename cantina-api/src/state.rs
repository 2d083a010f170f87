use std::sync::Arc;

use cantina_cart::CartEngine;
use cantina_catalog::CatalogRepository;
use cantina_core::NotificationSink;
use cantina_order::CheckoutEngine;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub cart: Arc<CartEngine>,
    pub orders: Arc<CheckoutEngine>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub sink: Arc<dyn NotificationSink>,
    pub auth: AuthConfig,
}
