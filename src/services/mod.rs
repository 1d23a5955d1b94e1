pub mod auth;
pub mod cache;
pub mod ownership;
pub mod routing;
