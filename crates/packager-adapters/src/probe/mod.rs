//! Revision existence probes.

mod http;

pub use http::HttpRefProbe;
