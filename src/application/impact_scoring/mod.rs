pub mod config;
pub mod dto;
pub mod rules;
pub mod scorer;
