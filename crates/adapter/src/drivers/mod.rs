pub mod bgg;
pub mod bot;
pub mod reddit;
