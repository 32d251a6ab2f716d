use log::{debug, error, info, warn};
use serialport::SerialPort;
use std::io::{ErrorKind, Read};
use std::time::Duration;

use super::gps_data::{is_fix_sentence, parse_fix_sentence};
use super::location::{Location, SharedLocation};
use crate::config::GpsSettings;
use crate::utils::error::BeaconError;

const READ_CHUNK: usize = 1024;
// A receiver streaming garbage without newlines must not grow the buffer forever.
const MAX_LINE_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Updated(Location),
    Ignored,
    Rejected(String),
}

/// Reads NMEA lines from a byte source and publishes every `$GPGGA` fix
/// into a [`SharedLocation`].
pub struct GpsReader<R: Read> {
    port: R,
    line_buffer: Vec<u8>,
    location: SharedLocation,
    idle_pause: Duration,
    read_error_threshold: u32,
}

impl GpsReader<Box<dyn SerialPort>> {
    pub fn open(settings: &GpsSettings, location: SharedLocation) -> Result<Self, BeaconError> {
        info!("🧭 Opening GPS on port {} at {} baud", settings.port, settings.baud_rate);

        let port = serialport::new(&settings.port, settings.baud_rate)
            .timeout(settings.read_timeout())
            .open()
            .map_err(|e| {
                BeaconError::ConnectionError(format!(
                    "Failed to open GPS port {}: {}",
                    settings.port, e
                ))
            })?;

        Ok(Self::new(port, location, settings))
    }
}

impl<R: Read> GpsReader<R> {
    pub fn new(port: R, location: SharedLocation, settings: &GpsSettings) -> Self {
        Self {
            port,
            line_buffer: Vec::new(),
            location,
            idle_pause: settings.idle_pause(),
            read_error_threshold: settings.read_error_threshold,
        }
    }

    /// Handles one decoded line. Only `$GPGGA` sentences can update the location.
    pub fn process_line(&self, line: &str) -> LineOutcome {
        let line = line.trim();
        if !is_fix_sentence(line) {
            return LineOutcome::Ignored;
        }

        match parse_fix_sentence(line) {
            Ok(fix) => {
                let location = fix.location();
                self.location.set(location.latitude, location.longitude);
                info!("📍 Updated GPS: {}", fix);
                LineOutcome::Updated(location)
            }
            Err(e) => {
                warn!("⚠️ Error reading GPS: {}", e);
                LineOutcome::Rejected(e.to_string())
            }
        }
    }

    /// One read from the port followed by processing of every completed line.
    /// Returns the number of bytes read; a read timeout counts as zero.
    pub fn poll(&mut self) -> Result<usize, BeaconError> {
        let mut buffer = [0u8; READ_CHUNK];
        let n = match self.port.read(&mut buffer) {
            Ok(n) => n,
            Err(ref e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => 0,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => 0,
            Err(e) => {
                return Err(BeaconError::CommunicationError(format!(
                    "GPS read error: {}",
                    e
                )))
            }
        };

        if n > 0 {
            self.line_buffer.extend_from_slice(&buffer[..n]);
            self.drain_lines();
        }
        Ok(n)
    }

    /// Polls until `read_error_threshold` consecutive read errors occur, then
    /// returns the last error so the caller can reopen the port.
    pub fn run(&mut self) -> BeaconError {
        info!("📡 Starting continuous GPS monitoring...");
        let mut consecutive_errors = 0u32;

        loop {
            match self.poll() {
                Ok(0) => {
                    consecutive_errors = 0;
                    std::thread::sleep(self.idle_pause);
                }
                Ok(_) => consecutive_errors = 0,
                Err(e) => {
                    consecutive_errors += 1;
                    error!(
                        "❌ {} ({}/{})",
                        e, consecutive_errors, self.read_error_threshold
                    );
                    if consecutive_errors >= self.read_error_threshold {
                        return e;
                    }
                    std::thread::sleep(self.idle_pause);
                }
            }
        }
    }

    fn drain_lines(&mut self) {
        while let Some(newline_pos) = self.line_buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.line_buffer.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            debug!("📥 Received GPS data: {}", line);
            self.process_line(line);
        }

        if self.line_buffer.len() > MAX_LINE_LEN {
            warn!(
                "⚠️ Discarding {} bytes of GPS data without line terminator",
                self.line_buffer.len()
            );
            self.line_buffer.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    const GGA_37_1: &str = "$GPGGA,123519,3706.000,N,12212.000,W,1,08,0.9,545.4,M,46.9,M,,*57";
    const GGA_MUNICH: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    /// Replays scripted reads, then times out forever.
    struct ScriptedPort {
        reads: VecDeque<io::Result<Vec<u8>>>,
    }

    impl ScriptedPort {
        fn new(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Self { reads: reads.into() }
        }
    }

    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(data)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                Some(Err(e)) => Err(e),
                None => Err(io::Error::new(ErrorKind::TimedOut, "timed out")),
            }
        }
    }

    fn settings() -> GpsSettings {
        GpsSettings {
            idle_pause_ms: 0,
            read_error_threshold: 3,
            ..GpsSettings::default()
        }
    }

    fn reader(reads: Vec<io::Result<Vec<u8>>>) -> (GpsReader<ScriptedPort>, SharedLocation) {
        let location = SharedLocation::new();
        let reader = GpsReader::new(ScriptedPort::new(reads), location.clone(), &settings());
        (reader, location)
    }

    #[test]
    fn test_fix_sentence_updates_location() {
        let (reader, location) = reader(vec![]);

        let outcome = reader.process_line(GGA_37_1);

        assert_eq!(outcome, LineOutcome::Updated(Location::new(37.1, -122.2)));
        assert_eq!(location.get().to_string(), "37.1,-122.2");
    }

    #[test]
    fn test_other_sentences_are_ignored() {
        let (reader, location) = reader(vec![]);

        assert_eq!(
            reader.process_line("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A"),
            LineOutcome::Ignored
        );
        assert_eq!(reader.process_line("garbage"), LineOutcome::Ignored);
        assert_eq!(location.get(), Location::default());
    }

    #[test]
    fn test_malformed_fix_leaves_location_unchanged() {
        let (reader, location) = reader(vec![]);

        assert!(matches!(
            reader.process_line("$GPGGA,123519,3706.0"),
            LineOutcome::Rejected(_)
        ));
        assert_eq!(location.get(), Location::default());
    }

    #[test]
    fn test_no_fix_sentence_is_published_as_origin() {
        let (reader, location) = reader(vec![]);
        reader.process_line(GGA_37_1);

        let outcome = reader.process_line("$GPGGA,123519,,,,,0,00,,,M,,M,,");

        assert_eq!(outcome, LineOutcome::Updated(Location::new(0.0, 0.0)));
        assert_eq!(location.get().to_payload(), b"0.0,0.0".to_vec());
    }

    #[test]
    fn test_lines_split_across_reads_are_reassembled() {
        let (head, tail) = GGA_37_1.split_at(20);
        let (mut reader, location) = reader(vec![
            Ok(head.as_bytes().to_vec()),
            Ok(format!("{}\r\n", tail).into_bytes()),
        ]);

        assert_eq!(reader.poll().unwrap(), 20);
        assert_eq!(location.get(), Location::default());

        reader.poll().unwrap();
        assert_eq!(location.get(), Location::new(37.1, -122.2));
    }

    #[test]
    fn test_bad_line_does_not_stop_later_lines() {
        let mut chunk = b"$GPGGA,12\xff\xfe,garbage*00\r\n".to_vec();
        chunk.extend_from_slice(format!("{}\r\n", GGA_37_1).as_bytes());
        let (mut reader, location) = reader(vec![Ok(chunk)]);

        reader.poll().unwrap();

        assert_eq!(location.get(), Location::new(37.1, -122.2));
    }

    #[test]
    fn test_latest_fix_wins() {
        let data = format!("{}\r\n{}\r\n", GGA_37_1, GGA_MUNICH);
        let (mut reader, location) = reader(vec![Ok(data.into_bytes())]);

        reader.poll().unwrap();

        assert!((location.get().latitude - 48.1173).abs() < 1e-9);
    }

    #[test]
    fn test_timeout_reads_as_zero_bytes() {
        let (mut reader, _) = reader(vec![]);
        assert_eq!(reader.poll().unwrap(), 0);
    }

    #[test]
    fn test_run_gives_up_after_consecutive_errors() {
        let broken = || Err(io::Error::new(ErrorKind::BrokenPipe, "unplugged"));
        let (mut reader, location) = reader(vec![
            broken(),
            Ok(format!("{}\n", GGA_37_1).into_bytes()),
            broken(),
            broken(),
            broken(),
        ]);

        let err = reader.run();

        assert!(matches!(err, BeaconError::CommunicationError(_)));
        assert_eq!(location.get(), Location::new(37.1, -122.2));
    }

    #[test]
    fn test_unterminated_garbage_is_discarded() {
        let (mut reader, _) = reader((0..5).map(|_| Ok(vec![b'x'; READ_CHUNK])).collect());
        for _ in 0..5 {
            reader.poll().unwrap();
        }
        assert!(reader.line_buffer.len() <= MAX_LINE_LEN);
    }
}
