//! Recording doubles for the device, hook scripts and sockets.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, UdpSocket};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mesh_config::AddressFamily;

use crate::device::{Device, DeviceError, DeviceStats};
use crate::listener::{Resolver, SocketFactory, SystemSocketFactory};
use crate::script::{ScriptEnvironment, ScriptError, ScriptRunner};

/// Ordered log of side effects shared between doubles.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    /// Appends `entry`.
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().expect("call log poisoned").push(entry.into());
    }

    /// Copy of the entries.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("call log poisoned").clone()
    }
}

/// Device that logs `open` and `close`, optionally refusing to open.
#[derive(Debug)]
pub struct RecordingDevice {
    log: CallLog,
    fail_open: bool,
    open: bool,
}

impl RecordingDevice {
    /// A device that opens successfully.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_open: false,
            open: false,
        }
    }

    /// A device whose `open` fails.
    pub fn failing(log: CallLog) -> Self {
        Self {
            fail_open: true,
            ..Self::new(log)
        }
    }
}

impl Device for RecordingDevice {
    fn device_name(&self) -> &str {
        "/dev/net/test"
    }

    fn interface(&self) -> &str {
        "test0"
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        self.log.push("device:open");
        if self.fail_open {
            return Err(DeviceError::Open {
                device: self.device_name().to_owned(),
                reason: "refused by test".to_owned(),
            });
        }
        self.open = true;
        Ok(())
    }

    fn read(&mut self, _buffer: &mut [u8]) -> Result<Option<usize>, DeviceError> {
        Ok(None)
    }

    fn write(&mut self, _packet: &[u8]) -> Result<(), DeviceError> {
        Ok(())
    }

    fn close(&mut self) {
        self.log.push("device:close");
        self.open = false;
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats::default()
    }
}

/// Script runner that logs each script and the environment it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingScriptRunner {
    log: CallLog,
    environments: Arc<Mutex<Vec<ScriptEnvironment>>>,
}

impl RecordingScriptRunner {
    /// A runner logging into `log`.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            environments: Arc::default(),
        }
    }

    /// Environments passed to each run, in order.
    pub fn environments(&self) -> Vec<ScriptEnvironment> {
        self.environments
            .lock()
            .expect("script runner poisoned")
            .clone()
    }
}

impl ScriptRunner for RecordingScriptRunner {
    fn run(&self, script: &str, environment: &ScriptEnvironment) -> Result<(), ScriptError> {
        self.log.push(format!("script:{script}"));
        self.environments
            .lock()
            .expect("script runner poisoned")
            .push(environment.clone());
        Ok(())
    }
}

/// Resolves every bind request to an ephemeral loopback port, so scenarios
/// never contend for the configured port.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackResolver;

impl Resolver for LoopbackResolver {
    fn resolve(
        &self,
        _host: Option<&str>,
        _port: u16,
        _family: AddressFamily,
    ) -> io::Result<Vec<SocketAddr>> {
        Ok(vec![SocketAddr::from((Ipv4Addr::LOCALHOST, 0))])
    }
}

/// System sockets, counting every TCP open attempt.
#[derive(Debug, Default)]
pub struct CountingSockets {
    attempts: AtomicUsize,
}

impl CountingSockets {
    /// TCP opens attempted so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl SocketFactory for CountingSockets {
    fn open_tcp(&self, address: SocketAddr) -> io::Result<TcpListener> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        SystemSocketFactory.open_tcp(address)
    }

    fn open_udp(&self, address: SocketAddr) -> io::Result<UdpSocket> {
        SystemSocketFactory.open_udp(address)
    }
}
