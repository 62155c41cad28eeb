//! NetBox REST transport.

mod client;
pub mod models;

pub use client::NetBoxClient;
