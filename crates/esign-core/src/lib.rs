#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod notification;
pub mod status;
pub mod types;
