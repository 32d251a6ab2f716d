use std::sync::Arc;
use uuid::Uuid;

use super::characteristic::Characteristic;
use super::error::GattError;
use super::properties::{self, InterfaceMap, PropertyMap, PropertyValue};
use super::GATT_SERVICE_IFACE;

/// `org.bluez.GattService1` object at `<path_base><index>`.
pub struct Service {
    path: String,
    uuid: Uuid,
    primary: bool,
    characteristics: Vec<Arc<dyn Characteristic>>,
}

impl Service {
    pub fn new(path_base: &str, index: usize, uuid: Uuid, primary: bool) -> Self {
        Self {
            path: format!("{}{}", path_base, index),
            uuid,
            primary,
            characteristics: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Object path the characteristic at `index` lives at.
    pub fn characteristic_path(&self, index: usize) -> String {
        format!("{}/char{}", self.path, index)
    }

    pub fn add_characteristic(&mut self, characteristic: Arc<dyn Characteristic>) {
        self.characteristics.push(characteristic);
    }

    pub fn characteristics(&self) -> &[Arc<dyn Characteristic>] {
        &self.characteristics
    }

    pub fn characteristic_paths(&self) -> Vec<String> {
        self.characteristics
            .iter()
            .map(|chrc| chrc.path().to_string())
            .collect()
    }

    pub fn properties(&self) -> InterfaceMap {
        let mut props = PropertyMap::new();
        props.insert("UUID".to_string(), PropertyValue::Str(self.uuid.to_string()));
        props.insert("Primary".to_string(), PropertyValue::Bool(self.primary));
        props.insert(
            "Characteristics".to_string(),
            PropertyValue::ObjectPaths(self.characteristic_paths()),
        );

        let mut interfaces = InterfaceMap::new();
        interfaces.insert(GATT_SERVICE_IFACE.to_string(), props);
        interfaces
    }

    pub fn get_all(&self, interface: &str) -> Result<PropertyMap, GattError> {
        properties::get_all(self.properties(), interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeripheralSettings;
    use crate::devices::gps::SharedLocation;
    use crate::peripheral::location::location_service;
    use crate::peripheral::GATT_CHRC_IFACE;

    #[test]
    fn test_service_properties() {
        let (service, _) = location_service(&PeripheralSettings::default(), 0, SharedLocation::new());

        assert_eq!(service.path(), "/org/bluez/example/service0");
        let props = service.get_all(GATT_SERVICE_IFACE).unwrap();
        assert_eq!(
            props.get("UUID"),
            Some(&PropertyValue::Str("12345678-1234-5678-1234-56789abcdef0".to_string()))
        );
        assert_eq!(props.get("Primary"), Some(&PropertyValue::Bool(true)));
        assert_eq!(
            props.get("Characteristics"),
            Some(&PropertyValue::ObjectPaths(vec![
                "/org/bluez/example/service0/char0".to_string()
            ]))
        );
    }

    #[test]
    fn test_service_rejects_characteristic_interface() {
        let service = Service::new("/org/bluez/example/service", 3, Uuid::nil(), false);
        assert_eq!(service.path(), "/org/bluez/example/service3");
        assert_eq!(service.characteristic_path(1), "/org/bluez/example/service3/char1");
        assert!(matches!(
            service.get_all(GATT_CHRC_IFACE),
            Err(GattError::InvalidArgs(_))
        ));
    }
}
