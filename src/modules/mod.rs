pub mod auth;
pub mod config;
pub mod meal;

mod router;
pub use router::get_router;
