pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod gallery;
pub mod i18n;
pub mod router;
pub mod security;
pub mod server;
pub mod shell;
