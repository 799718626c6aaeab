mod handler;
pub(super) mod service;
pub(super) mod types;

pub use handler::handler;
