pub mod actions;
pub mod client;
pub mod codec;
pub mod configuration;
pub mod controller;
pub mod error;
pub mod provider;
pub mod push;
pub mod registry;
pub mod server;
pub mod types;
pub mod worker;

#[cfg(test)]
mod test_support;
