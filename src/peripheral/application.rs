use std::sync::Arc;

use super::properties::ManagedObjects;
use super::service::Service;

/// Root of the exported GATT hierarchy; answers
/// `org.freedesktop.DBus.ObjectManager.GetManagedObjects`.
pub struct Application {
    path: String,
    services: Vec<Arc<Service>>,
}

impl Application {
    pub fn new() -> Self {
        Self {
            path: "/".to_string(),
            services: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn add_service(&mut self, service: Arc<Service>) {
        self.services.push(service);
    }

    pub fn services(&self) -> &[Arc<Service>] {
        &self.services
    }

    /// Full path -> interface -> property snapshot of every service and
    /// characteristic.
    pub fn managed_objects(&self) -> ManagedObjects {
        let mut objects = ManagedObjects::new();
        for service in &self.services {
            objects.insert(service.path().to_string(), service.properties());
            for chrc in service.characteristics() {
                objects.insert(chrc.path().to_string(), chrc.properties());
            }
        }
        objects
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeripheralSettings;
    use crate::devices::gps::SharedLocation;
    use crate::peripheral::location::location_service;
    use crate::peripheral::properties::PropertyValue;
    use crate::peripheral::{GATT_CHRC_IFACE, GATT_SERVICE_IFACE};

    #[test]
    fn test_managed_objects_snapshot() {
        let (service, _) = location_service(&PeripheralSettings::default(), 0, SharedLocation::new());
        let mut app = Application::new();
        app.add_service(Arc::new(service));

        let objects = app.managed_objects();

        assert_eq!(app.path(), "/");
        assert_eq!(
            objects.keys().cloned().collect::<Vec<_>>(),
            vec![
                "/org/bluez/example/service0".to_string(),
                "/org/bluez/example/service0/char0".to_string(),
            ]
        );
        assert!(objects["/org/bluez/example/service0"].contains_key(GATT_SERVICE_IFACE));
        assert_eq!(
            objects["/org/bluez/example/service0/char0"][GATT_CHRC_IFACE].get("Service"),
            Some(&PropertyValue::ObjectPath("/org/bluez/example/service0".to_string()))
        );
    }

    #[test]
    fn test_empty_application() {
        assert!(Application::default().managed_objects().is_empty());
    }
}
