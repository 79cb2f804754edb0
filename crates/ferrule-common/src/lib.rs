//! Common HTTP vocabulary for ferrule
//!
//! This crate provides the method and status types shared by the ferrule crates.

pub mod http;

pub use http::{HttpMethod, HttpStatus, HttpRequestLike, HttpResponseLike};
