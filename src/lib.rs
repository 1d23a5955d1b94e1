//! Request gateway for the shop platform: session continuity, authentication
//! gate and role/ownership authorization in front of the business handlers.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;
