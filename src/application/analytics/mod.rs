pub mod config;
pub mod dto;
pub mod export;
pub mod orchestrator;
pub mod report;
