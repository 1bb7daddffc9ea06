pub mod cli;
pub mod config;
pub mod domain;
pub mod dto;
pub mod infrastructure;
pub mod services;
