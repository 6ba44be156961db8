pub mod admin;
pub mod handlers;
pub mod routes;
pub mod static_files;

pub use handlers::AppState;
pub use routes::create_router;
