//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses the cane's millisecond epoch timestamp (`u64`) as primary clock
//! - Freshness windows (fresh/stale/expired) are evaluated against the handheld clock

mod config;
mod error;
mod gps;
mod imu;
mod instruction;
mod obstacle;
mod packet;
mod route;
mod snapshot;
mod source;
mod speech;
mod transport;
mod water;

pub use config::*;
pub use error::*;
pub use gps::*;
pub use imu::*;
pub use instruction::*;
pub use obstacle::*;
pub use packet::*;
pub use route::*;
pub use snapshot::*;
pub use source::{PacketCallback, PacketSource};
pub use speech::*;
pub use transport::{CaneTransport, ConnectionCallback, LocalCaneTransport};
pub use water::*;
