//! The virtual network device the daemon reads packets from and writes
//! packets to.

use mesh_config::{ConfigStore, Scope};
use thiserror::Error;
use tracing::info;

const DEVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::device");

/// Name used for the dummy device and its interface when none is
/// configured.
pub const DUMMY_DEVICE_NAME: &str = "dummy";

/// Errors raised by a device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device could not be opened.
    #[error("could not open device '{device}': {reason}")]
    Open {
        /// Device path or name.
        device: String,
        /// Driver diagnostic.
        reason: String,
    },
    /// The device was used before `open` or after `close`.
    #[error("device '{device}' is not open")]
    NotOpen {
        /// Device path or name.
        device: String,
    },
}

/// Traffic counters kept by a device.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStats {
    /// Packets read from the device.
    pub in_packets: u64,
    /// Bytes read from the device.
    pub in_bytes: u64,
    /// Packets written to the device.
    pub out_packets: u64,
    /// Bytes written to the device.
    pub out_bytes: u64,
}

/// A tunnel device driver.
pub trait Device {
    /// Device path or name, as passed to scripts in `DEVICE`.
    fn device_name(&self) -> &str;

    /// Interface name, as passed to scripts in `INTERFACE`.
    fn interface(&self) -> &str;

    /// Opens the device.
    fn open(&mut self) -> Result<(), DeviceError>;

    /// Reads one packet into `buffer`, returning its length, or `None` when
    /// no packet is waiting.
    fn read(&mut self, buffer: &mut [u8]) -> Result<Option<usize>, DeviceError>;

    /// Writes one packet.
    fn write(&mut self, packet: &[u8]) -> Result<(), DeviceError>;

    /// Closes the device; closing a closed device does nothing.
    fn close(&mut self);

    /// Traffic counters.
    fn stats(&self) -> DeviceStats;
}

/// Device that discards writes and never yields packets.
#[derive(Debug)]
pub struct DummyDevice {
    device: String,
    interface: String,
    open: bool,
    stats: DeviceStats,
}

impl DummyDevice {
    /// Dummy device with explicit names.
    #[must_use]
    pub fn new(device: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            interface: interface.into(),
            open: false,
            stats: DeviceStats::default(),
        }
    }

    /// Dummy device named by the `Device` and `Interface` settings.
    #[must_use]
    pub fn from_config(config: &dyn ConfigStore) -> Self {
        let device = config
            .lookup_string(Scope::Global, "Device")
            .unwrap_or_else(|| DUMMY_DEVICE_NAME.to_owned());
        let interface = config
            .lookup_string(Scope::Global, "Interface")
            .unwrap_or_else(|| DUMMY_DEVICE_NAME.to_owned());
        Self::new(device, interface)
    }

    fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.open {
            Ok(())
        } else {
            Err(DeviceError::NotOpen {
                device: self.device.clone(),
            })
        }
    }
}

impl Device for DummyDevice {
    fn device_name(&self) -> &str {
        &self.device
    }

    fn interface(&self) -> &str {
        &self.interface
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        self.open = true;
        info!(
            target: DEVICE_TARGET,
            device = %self.device,
            interface = %self.interface,
            "dummy device opened"
        );
        Ok(())
    }

    fn read(&mut self, _buffer: &mut [u8]) -> Result<Option<usize>, DeviceError> {
        self.ensure_open()?;
        Ok(None)
    }

    fn write(&mut self, packet: &[u8]) -> Result<(), DeviceError> {
        self.ensure_open()?;
        self.stats.out_packets += 1;
        self.stats.out_bytes += packet.len() as u64;
        Ok(())
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        info!(
            target: DEVICE_TARGET,
            device = %self.device,
            in_packets = self.stats.in_packets,
            in_bytes = self.stats.in_bytes,
            out_packets = self.stats.out_packets,
            out_bytes = self.stats.out_bytes,
            "device closed"
        );
    }

    fn stats(&self) -> DeviceStats {
        self.stats
    }
}
