//! CLI front end for the chat client.

mod runner;

pub use runner::{run_client, ClientConfig};
