use std::io::{BufRead, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::distance::domain::distance_estimate::{DistanceEstimate, DistanceSourceKind};
use crate::distance::domain::distance_source::DistanceSource;
use crate::distance::infrastructure::sensor_line::parse_sensor_line;
use crate::distance::infrastructure::sensor_transport::{open_reader, SensorAddress, SensorError};
use crate::shared::frame::Frame;
use crate::shared::latest_value::LatestValue;

/// How long `shutdown` waits for the reader thread before detaching it.
const STOP_TIMEOUT: Duration = Duration::from_millis(500);

/// Distance reported by an external sensor over a line-oriented transport.
///
/// A background thread connects, reads `Distance: <float>` lines and keeps
/// the latest value in a [`LatestValue`] cell. The render loop only reads
/// that cell, so a slow or dead sensor never stalls a tick.
pub struct ExternalSensorSource {
    address: SensorAddress,
    latest: Arc<LatestValue>,
    connected: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    done: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl ExternalSensorSource {
    /// Starts the reader thread. Connection happens on that thread; a
    /// failure there leaves the source permanently invalid.
    pub fn start(address: SensorAddress) -> Result<Self, SensorError> {
        let latest = Arc::new(LatestValue::new());
        let connected = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done) = crossbeam_channel::bounded::<()>(1);

        let handle = {
            let reader_address = address.clone();
            let latest = latest.clone();
            let connected = connected.clone();
            let stop = stop.clone();
            thread::Builder::new()
                .name("sensor-reader".into())
                .spawn(move || run_reader(&reader_address, &latest, &connected, &stop, done_tx))
                .map_err(|source| SensorError::Connect {
                    address: address.to_string(),
                    source,
                })?
        };

        Ok(Self {
            address,
            latest,
            connected,
            stop,
            done,
            handle: Some(handle),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl DistanceSource for ExternalSensorSource {
    fn kind(&self) -> DistanceSourceKind {
        DistanceSourceKind::ExternalSensor
    }

    fn distance(&mut self, _frame: Option<&Frame>) -> DistanceEstimate {
        match self.latest.load() {
            Some(value) if self.is_connected() => {
                DistanceEstimate::valid(value, DistanceSourceKind::ExternalSensor)
            }
            _ => DistanceEstimate::invalid(DistanceSourceKind::ExternalSensor),
        }
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        match self.done.recv_timeout(STOP_TIMEOUT) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    log::warn!("Sensor reader for {} panicked", self.address);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "Sensor reader for {} did not stop within {:?}; detaching it",
                    self.address,
                    STOP_TIMEOUT
                );
            }
        }
        self.connected.store(false, Ordering::Release);
    }
}

impl Drop for ExternalSensorSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_reader(
    address: &SensorAddress,
    latest: &LatestValue,
    connected: &AtomicBool,
    stop: &AtomicBool,
    _done: Sender<()>,
) {
    let mut reader = match open_reader(address) {
        Ok(reader) => reader,
        Err(e) => {
            log::warn!("External sensor disabled: {e}");
            return;
        }
    };
    connected.store(true, Ordering::Release);
    log::info!("Connected to external sensor at {address}");

    read_lines(reader.as_mut(), latest, stop);

    latest.clear();
    connected.store(false, Ordering::Release);
    log::info!("External sensor at {address} disconnected");
}

fn read_lines(reader: &mut dyn BufRead, latest: &LatestValue, stop: &AtomicBool) {
    let mut line = String::new();
    while !stop.load(Ordering::Acquire) {
        match reader.read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => {
                match parse_sensor_line(&line) {
                    Some(value) => latest.store(value),
                    None => log::debug!("Ignoring malformed sensor line {:?}", line.trim()),
                }
                line.clear();
            }
            // Timeouts keep any partial line in the buffer for the next read.
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                log::debug!("Ignoring non-UTF-8 sensor data");
                line.clear();
            }
            Err(e) => {
                log::warn!("Sensor read failed: {e}");
                return;
            }
        }
    }
}
