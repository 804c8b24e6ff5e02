pub mod api;
pub mod assembler;
pub mod auth;
pub mod board;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod entities;
pub mod error;
pub mod external;
pub mod summary;

#[cfg(test)]
mod testing;
