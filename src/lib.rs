pub mod auth;
pub mod config;
pub mod domain;
pub mod money;
pub mod persistence;
pub mod web;

pub use money::*;
