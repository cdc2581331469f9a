//! PacketSource trait - Cane data source abstraction
//!
//! Defines a unified interface for cane packet sources, decoupling the
//! pipeline from the concrete transport. Supports unified handling of the
//! real BLE link and mock/replay sources.

use std::sync::Arc;

use crate::CanePacket;

/// Packet callback type
///
/// When the source produces a packet, it delivers a `CanePacket` through
/// this callback. Uses `Arc` to allow callback sharing across contexts.
pub type PacketCallback = Arc<dyn Fn(CanePacket) + Send + Sync>;

/// Cane packet source trait
///
/// Abstracts the common behavior of the BLE transport and mock/replay
/// sources. The transport parses the notify payload bytes to JSON; the
/// core never sees raw frames.
///
/// # Design Principles
///
/// 1. **Decoupling**: separates packet production from packet consumption
/// 2. **Unified Interface**: real, mock and replay sources share the API
/// 3. **Callback Pattern**: callbacks instead of channels, matching the
///    notify-driven shape of the BLE stack
pub trait PacketSource: Send + Sync {
    /// Advertised source name (e.g. "OPEN-EYES")
    fn source_name(&self) -> &str;

    /// Register the packet callback and start delivery
    ///
    /// If already listening, repeated calls are idempotent (no second
    /// callback is registered).
    fn listen(&self, callback: PacketCallback);

    /// Stop packet delivery
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
