pub mod cache;
pub mod dtos;
pub mod handlers;
pub mod router;
