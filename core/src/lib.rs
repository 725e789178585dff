pub mod catalog;
pub mod catalog_import;
pub mod db;
pub mod error;
pub mod memory;
pub mod models;
pub mod nutrition;
pub mod service;
pub mod store;
