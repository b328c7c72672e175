pub mod cleaning;
pub mod config;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod scrapers;
pub mod summary;
