pub mod client;
pub mod data;
pub mod error;
pub mod interface;
#[cfg(test)]
pub mod memory;
