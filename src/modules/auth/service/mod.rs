pub mod firebase;
pub mod identity;
