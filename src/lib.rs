pub mod api;
pub mod auth;
pub mod billing;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod models;
pub mod receipt;
pub mod repository;
pub mod routes;
