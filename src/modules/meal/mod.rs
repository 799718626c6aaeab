pub mod ownership;
pub mod repository;
pub mod routes;
pub mod validation;
