pub mod domain;
pub mod forms;
pub mod models;
pub mod realtime;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;
pub mod webhook;

pub const SERVICE_ACCESS_ROLE: &str = "admin";
