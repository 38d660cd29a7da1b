pub mod api;
pub mod auth;
pub mod banner;
pub mod config;
pub mod consts;
pub mod controllers;
pub mod manifest;
pub mod render;
pub mod server;
pub mod session;
pub mod workers;
