//! CaneTransport trait - BLE link abstraction
//!
//! Defines the connection-management surface of the BLE transport
//! collaborator. The link scans for the advertised device name, parses
//! notify payloads into packets, and reports connection changes; the core
//! consumes packets through the `PacketSource` half of the trait.

use std::sync::Arc;

use crate::{CoreError, PacketSource};

/// Connection state callback type
///
/// Invoked with `true` on (re)connection and `false` on link loss.
pub type ConnectionCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Cane link trait
///
/// Connection management on top of `PacketSource`. Reconnection policy
/// (scan intervals, backoff) belongs to the implementation; service and
/// characteristic identifiers are its runtime configuration.
#[trait_variant::make(CaneTransport: Send)]
pub trait LocalCaneTransport: PacketSource {
    /// Establish the link to the advertised device
    ///
    /// # Errors
    /// Returns a transport error when the device cannot be reached
    async fn connect(&mut self) -> Result<(), CoreError>;

    /// Tear the link down
    async fn disconnect(&mut self) -> Result<(), CoreError>;

    /// Link is currently established
    fn is_connected(&self) -> bool;

    /// Register the connection state callback
    ///
    /// At most one callback is active; registering replaces the previous
    /// one.
    fn on_connection_change(&self, callback: ConnectionCallback);
}
