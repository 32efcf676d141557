pub mod config_entity;
