use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Socket read timeout; bounds how long the reader can go without checking
/// its stop flag.
pub const READ_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("cannot connect to sensor at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid sensor address '{0}' (expected tcp://host:port or a device path)")]
    InvalidAddress(String),
}

/// Where sensor lines come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SensorAddress {
    /// `host:port` of a line-oriented TCP stream.
    Tcp(String),
    /// A character device or file, e.g. a USB serial port.
    Device(PathBuf),
}

impl FromStr for SensorAddress {
    type Err = SensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(host_port) = s.strip_prefix("tcp://") {
            let valid = host_port
                .rsplit_once(':')
                .map(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
                .unwrap_or(false);
            return if valid {
                Ok(Self::Tcp(host_port.to_string()))
            } else {
                Err(SensorError::InvalidAddress(s.to_string()))
            };
        }
        if s.is_empty() || s.contains("://") {
            return Err(SensorError::InvalidAddress(s.to_string()));
        }
        Ok(Self::Device(PathBuf::from(s)))
    }
}

impl fmt::Display for SensorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(host_port) => write!(f, "tcp://{host_port}"),
            Self::Device(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Opens a buffered line reader on the transport.
///
/// TCP streams get a read timeout. Device reads may block indefinitely; the
/// caller must be prepared to abandon a reader stuck in `read_line`.
pub fn open_reader(address: &SensorAddress) -> Result<Box<dyn BufRead + Send>, SensorError> {
    let connect_err = |source| SensorError::Connect {
        address: address.to_string(),
        source,
    };
    match address {
        SensorAddress::Tcp(host_port) => {
            let socket_addr = host_port
                .to_socket_addrs()
                .map_err(connect_err)?
                .next()
                .ok_or_else(|| SensorError::InvalidAddress(address.to_string()))?;
            let stream =
                TcpStream::connect_timeout(&socket_addr, CONNECT_TIMEOUT).map_err(connect_err)?;
            stream
                .set_read_timeout(Some(READ_TIMEOUT))
                .map_err(connect_err)?;
            Ok(Box::new(BufReader::new(stream)))
        }
        SensorAddress::Device(path) => {
            let file = File::open(path).map_err(connect_err)?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}
