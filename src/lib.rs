pub mod config;
pub mod db;
pub mod delivery;
pub mod i18n;
pub mod intake;
pub mod server;
