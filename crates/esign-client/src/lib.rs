#![forbid(unsafe_code)]

pub mod client;
pub mod request;

pub use client::{BackendClient, ClientError};
pub use request::EnvelopeRequest;
