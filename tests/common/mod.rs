use async_trait::async_trait;
use serbridge::domain::config::SerialSettings;
use serbridge::{BridgeError, BridgeResult, Device, PortProvider};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Reader handed out by the scripted provider. Yields its chunks one per
/// read, then behaves like an idle serial port (timeout). Decrements the
/// shared open-handle count on drop.
pub struct ScriptedReader {
    chunks: VecDeque<Vec<u8>>,
    fail_after_script: bool,
    open_handles: Arc<AtomicUsize>,
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.chunks.pop_front() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None if self.fail_after_script => {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
        }
    }
}

impl Drop for ScriptedReader {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted `PortProvider`: a mutable device list and a byte-stream script
/// replayed to every opened connection.
pub struct ScriptedProvider {
    devices: Mutex<Vec<Device>>,
    script: Mutex<Vec<Vec<u8>>>,
    pub fail_open: AtomicBool,
    pub fail_enumerate: AtomicBool,
    /// Readers report a broken pipe once their script runs out, instead of
    /// idling like a quiet serial port.
    pub fail_read_after_script: AtomicBool,
    open_handles: Arc<AtomicUsize>,
    opens: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices: Mutex::new(devices),
            script: Mutex::new(Vec::new()),
            fail_open: AtomicBool::new(false),
            fail_enumerate: AtomicBool::new(false),
            fail_read_after_script: AtomicBool::new(false),
            open_handles: Arc::new(AtomicUsize::new(0)),
            opens: AtomicUsize::new(0),
        }
    }

    pub fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.lock().unwrap() = devices;
    }

    pub fn set_script(&self, chunks: Vec<Vec<u8>>) {
        *self.script.lock().unwrap() = chunks;
    }

    pub fn open_handle_count(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PortProvider for ScriptedProvider {
    async fn enumerate(&self) -> BridgeResult<Vec<Device>> {
        if self.fail_enumerate.load(Ordering::SeqCst) {
            return Err(BridgeError::Enumeration("scripted failure".to_string()));
        }
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn open(
        &self,
        device_id: &str,
        _settings: &SerialSettings,
    ) -> BridgeResult<Box<dyn Read + Send>> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(BridgeError::Connection {
                message: format!("Scripted failure opening '{}'", device_id),
            });
        }
        if !self.devices.lock().unwrap().iter().any(|d| d.id == device_id) {
            return Err(BridgeError::Connection {
                message: format!("No such device '{}'", device_id),
            });
        }

        self.opens.fetch_add(1, Ordering::SeqCst);
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedReader {
            chunks: self.script.lock().unwrap().clone().into(),
            fail_after_script: self.fail_read_after_script.load(Ordering::SeqCst),
            open_handles: Arc::clone(&self.open_handles),
        }))
    }
}

pub fn device(id: &str) -> Device {
    Device::new(id, id)
}
