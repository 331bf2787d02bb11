pub mod common;
pub mod point;
pub mod query;
pub mod route;
