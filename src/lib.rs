pub mod cli;
pub mod config;
pub mod error;
pub mod labeler;
pub mod report;
pub mod rules;
pub mod sources;
pub mod webhook;

#[cfg(test)]
mod test_helpers;
