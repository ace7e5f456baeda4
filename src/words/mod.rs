// Word resource: the template's example CRUD collection

pub mod handlers;
pub mod models;
pub mod repository;
pub mod seed;

pub use handlers::*;
pub use models::*;
pub use repository::*;
