//! Backend Pong : sessions, OAuth GitHub, tournois, matchs et chat.
//!
//! Le binaire (`main.rs`) ne fait que l'amorçage ; toute la logique vit ici.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;
