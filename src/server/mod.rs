pub mod auth;
pub mod rate_limit;
pub mod responses;
pub mod routes;
pub mod validation;
