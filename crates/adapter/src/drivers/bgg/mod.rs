mod client;
mod xml;

pub use client::{BggClient, BggConfig};
