pub mod calculations;
pub mod models;
pub mod store;

pub use store::{SessionStore, StoreError};
pub use models::*;
