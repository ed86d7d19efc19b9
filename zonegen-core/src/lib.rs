//! DNS zone text generation and IPv4 range partitioning primitives used by
//! higher-level regeneration tools.

pub mod error;
pub mod forward;
pub mod model;
pub mod range;
pub mod reverse;
pub mod serial;

pub use error::ZoneError;
pub use forward::render_forward;
pub use model::{
    AliasRecord, Extension, HostRecord, Ipv4Assignment, Ipv6Assignment, MxRecord, NsRecord,
    SoaMeta, SrvRecord, TxtRecord, ZoneData, ZoneMeta,
};
pub use range::{network_for_range, partition, RangeGroup};
pub use reverse::{ptr_fragment, render_reverse, reverse_origin, ReverseZone};
pub use serial::ZoneSerial;
