pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod errors;
pub mod migrations;
pub mod report;
pub mod stats;

#[cfg(test)]
mod tests;
