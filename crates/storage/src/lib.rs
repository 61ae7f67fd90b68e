pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use client::{Filters, PostgrestClient};
pub use config::ClientConfig;
pub use error::{Result, StorageError};
