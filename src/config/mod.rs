/// Database configuration and connection management
pub mod database;

/// Stall configuration loading from config.toml
pub mod stalls;
