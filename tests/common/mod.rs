#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use smarthouse_gateway::DeviceLink;

/// Byte sink standing in for the serial port.
#[derive(Clone, Default)]
pub struct Wire(Arc<Mutex<Vec<u8>>>);

impl Wire {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(String::from).collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl Write for Wire {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that rejects writes whose line starts with one of `fail_prefixes`.
#[derive(Clone)]
pub struct FlakyWire {
    pub wire: Wire,
    fail_prefixes: Vec<&'static str>,
}

impl FlakyWire {
    pub fn new(fail_prefixes: Vec<&'static str>) -> Self {
        Self {
            wire: Wire::default(),
            fail_prefixes,
        }
    }
}

impl Write for FlakyWire {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        if self.fail_prefixes.iter().any(|p| text.starts_with(p)) {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
        }
        self.wire.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn recording_link() -> (Arc<DeviceLink>, Wire) {
    let wire = Wire::default();
    (Arc::new(DeviceLink::from_writer(wire.clone())), wire)
}
