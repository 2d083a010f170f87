pub mod menu;
pub mod dish;
pub mod repository;

pub use menu::{MenuDetail, MenuOffering, NewMenuOffering};
pub use dish::{Dish, NewDish};
pub use repository::CatalogRepository;
