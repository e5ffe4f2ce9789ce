//! API client module

pub mod bulk;
pub mod client;
pub mod container;
pub mod error;
pub mod pagination;
pub(crate) mod polymorphic;
pub mod query;
pub mod response;
pub mod transport;

pub use client::Client;
