#![forbid(unsafe_code)]

pub mod apply;
pub mod convert;
pub mod derive;
pub mod store;
