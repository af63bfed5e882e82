//! Database repositories
//!
//! Provides data access layer for database operations. Users and items sit
//! behind store traits because authentication and deletion depend on them;
//! categories and reviews are plain PostgreSQL repositories.

pub mod category;
pub mod item;
pub mod review;
pub mod user;

pub use category::{CategoryCountRecord, CategoryRecord, CategoryRepository};
pub use item::{
    Collection, CreateItem, ItemRecord, ItemRepository, ItemStore, NameTaken, UpdateItem,
};
pub use review::{CreateReview, RatingSummary, ReviewRecord, ReviewRepository};
pub use user::{CreateUser, UpdateUserProfile, UserRecord, UserRepository, UserStore};
