use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Position reported before the receiver delivers its first fix (San Francisco).
pub const DEFAULT_LATITUDE: f64 = 37.7749;
pub const DEFAULT_LONGITUDE: f64 = -122.4194;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Characteristic payload: `"<lat>,<lon>"` as UTF-8 bytes.
    pub fn to_payload(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}

// `{:?}` keeps the decimal point on whole degrees ("0.0", not "0").
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?},{:?}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Default)]
struct LocationState {
    location: Location,
    updated_at: Option<DateTime<Utc>>,
}

/// Latest known position, shared between the GPS thread (writer) and the
/// notification timer (reader). Clones refer to the same value.
#[derive(Debug, Clone, Default)]
pub struct SharedLocation {
    inner: Arc<Mutex<LocationState>>,
}

impl SharedLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, latitude: f64, longitude: f64) {
        let mut state = self.lock();
        state.location = Location::new(latitude, longitude);
        state.updated_at = Some(Utc::now());
    }

    pub fn get(&self) -> Location {
        self.lock().location
    }

    /// Time of the last successful `set`, `None` while still on the default.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.lock().updated_at
    }

    // A panicking writer cannot leave a half-written pair behind, so a
    // poisoned guard still holds a consistent value.
    fn lock(&self) -> MutexGuard<'_, LocationState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_location_before_first_fix() {
        let shared = SharedLocation::new();
        assert_eq!(shared.get(), Location::new(37.7749, -122.4194));
        assert_eq!(shared.get().to_string(), "37.7749,-122.4194");
        assert!(shared.updated_at().is_none());
    }

    #[test]
    fn test_set_is_visible_through_clones() {
        let shared = SharedLocation::new();
        let writer = shared.clone();

        writer.set(48.1173, 11.516666666666667);

        assert_eq!(shared.get(), Location::new(48.1173, 11.516666666666667));
        assert!(shared.updated_at().is_some());
    }

    #[test]
    fn test_concurrent_writer_never_tears_the_pair() {
        let shared = SharedLocation::new();
        let writer = shared.clone();

        let handle = std::thread::spawn(move || {
            for i in 0..1000 {
                let v = i as f64;
                writer.set(v, -v);
            }
        });

        for _ in 0..1000 {
            let location = shared.get();
            if location != Location::default() {
                assert_eq!(location.latitude, -location.longitude);
            }
        }
        handle.join().unwrap();
    }

    #[test]
    fn test_payload_format() {
        let location = Location::new(37.1, -122.2);
        assert_eq!(location.to_payload(), b"37.1,-122.2".to_vec());
        assert_eq!(Location::new(0.0, 151.0).to_string(), "0.0,151.0");
    }
}
