pub mod cli;
pub mod suite_config;
pub mod target;

#[cfg(feature = "cli")]
mod cli_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

