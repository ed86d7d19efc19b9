//! Operator-side regeneration of campus network service configuration.
//!
//! The binary pulls authoritative host/IP/MAC/zone data from the central
//! directory service over HTTP, renders on-disk artifacts (DNS zone files,
//! DHCP lease lists, MAC/IP allow-lists, mailing-list membership files),
//! validates them with the configured external checkers, and reloads the
//! corresponding system services. Runs are batch and synchronous; an
//! external scheduler is expected to serialize them.
//!
//! Zone text generation and range partitioning live in `zonegen-core`; this
//! crate supplies the fetch, orchestration, write, verify and reload layers
//! around it.

pub mod client;
pub mod config;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod output;
pub mod progress;
pub mod services;
