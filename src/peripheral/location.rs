use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::characteristic::{apply_read_offset, Characteristic, ReadOptions};
use super::error::GattError;
use super::service::Service;
use crate::config::PeripheralSettings;
use crate::devices::gps::SharedLocation;

/// Read/notify characteristic carrying the latest position as `"<lat>,<lon>"`.
///
/// Subscription state is `idle` until `StartNotify`, `notifying` until
/// `StopNotify`; repeats of either are no-ops.
pub struct LocationCharacteristic {
    path: String,
    service_path: String,
    uuid: Uuid,
    location: SharedLocation,
    notifying: AtomicBool,
}

impl LocationCharacteristic {
    pub fn new(service: &Service, index: usize, uuid: Uuid, location: SharedLocation) -> Self {
        Self {
            path: service.characteristic_path(index),
            service_path: service.path().to_string(),
            uuid,
            location,
            notifying: AtomicBool::new(false),
        }
    }

    pub fn is_notifying(&self) -> bool {
        self.notifying.load(Ordering::SeqCst)
    }

    fn payload(&self) -> Vec<u8> {
        self.location.get().to_payload()
    }
}

impl Characteristic for LocationCharacteristic {
    fn path(&self) -> &str {
        &self.path
    }

    fn service_path(&self) -> &str {
        &self.service_path
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn flags(&self) -> Vec<String> {
        vec!["read".to_string(), "notify".to_string()]
    }

    fn read_value(&self, options: &ReadOptions) -> Result<Vec<u8>, GattError> {
        let value = self.payload();
        info!(
            "📖 LocationCharacteristic Read: {}",
            String::from_utf8_lossy(&value)
        );
        apply_read_offset(value, options.offset)
    }

    fn start_notify(&self) -> Result<(), GattError> {
        if self.notifying.swap(true, Ordering::SeqCst) {
            info!("Already notifying, nothing to do");
        } else {
            info!("🔔 Location notifications enabled");
        }
        Ok(())
    }

    fn stop_notify(&self) -> Result<(), GattError> {
        if self.notifying.swap(false, Ordering::SeqCst) {
            info!("🔕 Location notifications disabled");
        } else {
            info!("Not notifying, nothing to do");
        }
        Ok(())
    }

    fn pending_notification(&self) -> Option<Vec<u8>> {
        if !self.is_notifying() {
            return None;
        }
        let value = self.payload();
        debug!("📤 Notifying location {}", String::from_utf8_lossy(&value));
        Some(value)
    }
}

/// Primary service at `index` holding the location characteristic as `char0`.
pub fn location_service(
    settings: &PeripheralSettings,
    index: usize,
    location: SharedLocation,
) -> (Service, Arc<LocationCharacteristic>) {
    let mut service = Service::new(&settings.service_path_base, index, settings.service_uuid, true);
    let characteristic = Arc::new(LocationCharacteristic::new(
        &service,
        0,
        settings.characteristic_uuid,
        location,
    ));
    service.add_characteristic(characteristic.clone());
    (service, characteristic)
}
