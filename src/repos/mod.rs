pub mod error;
pub mod shop_repo;
