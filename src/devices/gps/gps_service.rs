use log::{error, info, warn};
use std::thread::JoinHandle;
use std::time::Duration;

use super::gps_reader::GpsReader;
use super::location::SharedLocation;
use crate::config::{GpsSettings, ReconnectSettings};
use crate::utils::error::BeaconError;

/// Bounded exponential backoff for reopening the serial port.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl ReconnectPolicy {
    pub fn new(settings: &ReconnectSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
        }
    }

    /// Delay before reconnect attempt `attempt` (1-based), or `None` once the
    /// attempt budget is exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        let delay = self
            .initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff);
        Some(delay.min(self.max_backoff))
    }
}

/// Owns the serial port lifecycle of the GPS receiver on a dedicated thread.
pub struct GpsService {
    settings: GpsSettings,
    location: SharedLocation,
}

impl GpsService {
    pub fn new(settings: GpsSettings, location: SharedLocation) -> Self {
        Self { settings, location }
    }

    /// Spawns the detached reader thread. The thread is never joined; it ends
    /// with the process or once the reconnect budget is spent.
    pub fn start(self) -> Result<JoinHandle<()>, BeaconError> {
        std::thread::Builder::new()
            .name("gps-reader".to_string())
            .spawn(move || {
                let policy = ReconnectPolicy::new(&self.settings.reconnect);
                let result = supervise(&policy, std::thread::sleep, || {
                    GpsReader::open(&self.settings, self.location.clone())
                        .map(|mut reader| reader.run())
                });
                if let Err(e) = result {
                    error!("❌ GPS service stopped: {}", e);
                    match self.location.updated_at() {
                        Some(at) => warn!(
                            "⚠️ Serving last known location {} from {}",
                            self.location.get(),
                            at.format("%Y-%m-%d %H:%M:%S UTC")
                        ),
                        None => warn!("⚠️ No fix was ever received, serving the default location"),
                    }
                }
            })
            .map_err(|e| {
                BeaconError::ServiceNotAvailable(format!("Failed to spawn GPS thread: {}", e))
            })
    }
}

/// Reopen loop. `session` opens the port and runs it until it fails; an
/// `Ok` carries the error that ended a session which had opened fine, and
/// resets the attempt counter. Returns the final error once the reconnect
/// budget is exhausted.
fn supervise<S, F>(policy: &ReconnectPolicy, mut sleep: S, mut session: F) -> Result<(), BeaconError>
where
    S: FnMut(Duration),
    F: FnMut() -> Result<BeaconError, BeaconError>,
{
    let mut attempt = 0u32;

    loop {
        let failure = match session() {
            Ok(session_error) => {
                warn!("⚠️ GPS port lost: {}", session_error);
                attempt = 0;
                session_error
            }
            Err(open_error) => {
                error!("❌ Failed to initialize GPS reader: {}", open_error);
                open_error
            }
        };

        attempt += 1;
        match policy.delay_for(attempt) {
            Some(delay) => {
                info!("🔁 Reconnecting GPS in {:?} (attempt {})", delay, attempt);
                sleep(delay);
            }
            None => {
                return Err(BeaconError::ConnectionError(format!(
                    "giving up after {} reconnect attempts: {}",
                    attempt - 1,
                    failure
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> ReconnectPolicy {
        ReconnectPolicy::new(&ReconnectSettings {
            max_attempts,
            initial_backoff_ms: 1000,
            max_backoff_ms: 30_000,
        })
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = policy(10);
        let delays: Vec<u64> = (1..=7)
            .map(|a| policy.delay_for(a).unwrap().as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16_000, 30_000, 30_000]);
    }

    #[test]
    fn test_backoff_stops_after_budget() {
        let policy = policy(3);
        assert!(policy.delay_for(3).is_some());
        assert!(policy.delay_for(4).is_none());
        assert!(policy.delay_for(0).is_none());
    }

    #[test]
    fn test_huge_attempt_numbers_do_not_overflow() {
        let policy = policy(u32::MAX);
        assert_eq!(policy.delay_for(200), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_supervise_gives_up_when_port_never_opens() {
        let mut sleeps = Vec::new();
        let mut opens = 0;

        let result = supervise(&policy(3), |d| sleeps.push(d), || {
            opens += 1;
            Err(BeaconError::ConnectionError("no such device".to_string()))
        });

        assert!(matches!(result, Err(BeaconError::ConnectionError(_))));
        assert_eq!(opens, 4);
        assert_eq!(
            sleeps,
            vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[test]
    fn test_successful_session_resets_attempts() {
        let mut sleeps = Vec::new();
        let mut calls = 0;

        let result = supervise(&policy(2), |d| sleeps.push(d), || {
            calls += 1;
            match calls {
                1 | 2 => Err(BeaconError::ConnectionError("busy".to_string())),
                3 => Ok(BeaconError::CommunicationError("unplugged".to_string())),
                _ => Err(BeaconError::ConnectionError("gone".to_string())),
            }
        });

        assert!(result.is_err());
        // open fail, open fail, session ends (reset), open fail, open fail and give up
        assert_eq!(calls, 5);
        assert_eq!(
            sleeps,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(1),
                Duration::from_secs(2),
            ]
        );
    }
}
