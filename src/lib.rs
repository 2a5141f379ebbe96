//! privacy-manifest - build Apple privacy manifests from checkbox selections

pub mod catalog;
pub mod commands;
pub mod config;
pub mod manifest;
pub mod models;
pub mod plist;
pub mod store;
pub mod tui;
pub mod validation;
