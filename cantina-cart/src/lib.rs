pub mod engine;
pub mod models;
pub mod repository;

pub use engine::{AddItem, CartEngine};
pub use models::{Cart, CartLine, CartView, NewCartLine};
pub use repository::CartRepository;
