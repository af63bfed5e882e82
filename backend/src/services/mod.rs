//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories, the image storage and the cleanup worker.

pub mod cart;
pub mod category;
pub mod deletion;
pub mod item;
pub mod review;
pub mod user;

pub use cart::CartService;
pub use category::CategoryService;
pub use deletion::DeletionCoordinator;
pub use item::{ItemService, NewItem};
pub use review::ReviewService;
pub use user::UserService;
