//! Gateway server implementation (C8)

mod server;

pub use server::Gateway;
