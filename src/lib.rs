pub mod quiz;
pub mod server;
