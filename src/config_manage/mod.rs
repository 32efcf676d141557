pub mod config_manager;
pub mod entity;
