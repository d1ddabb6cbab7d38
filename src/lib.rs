pub mod api;
pub mod app_config;
pub mod books_repository;
mod handlers;
pub mod id_allocator;
