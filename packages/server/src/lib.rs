// Cap Table Extractor - API Core
//
// This crate provides the HTTP facade over the captable library: configuration,
// routing and request validation. Extraction itself lives in `captable`.

pub mod config;
pub mod server;

pub use config::*;
