pub mod client;
pub mod config;
pub mod dns;
pub mod dnssec;
pub mod error;
pub mod walk;

pub use dns::DNSPacket;
