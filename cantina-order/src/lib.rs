pub mod engine;
pub mod models;
pub mod repository;

pub use engine::{CheckoutEngine, DirectOrder, DishOrder};
pub use models::{NewOrderLine, Order, OrderLine, OrderStatus};
pub use repository::OrderRepository;
