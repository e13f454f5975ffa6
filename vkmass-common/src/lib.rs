// vkmass-common/src/lib.rs

pub mod error;
pub mod models;
pub mod seed;

pub use error::Error;
