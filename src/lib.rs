pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod draft;
pub mod error;
pub mod form;
pub mod models;
pub mod services;
pub mod state;
pub mod view;
