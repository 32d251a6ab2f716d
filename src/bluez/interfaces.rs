use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use zbus::fdo;
use zbus::interface;
use zbus::zvariant::{OwnedObjectPath, OwnedValue};

use super::error::BluezError;
use super::values::{self, DbusManagedObjects};
use crate::peripheral::{Advertisement, Application, Characteristic, PairingAgent, Service};

fn path_error(err: zbus::zvariant::Error) -> fdo::Error {
    fdo::Error::Failed(format!("Invalid object path: {}", err))
}

/// Root of the GATT application, answering BlueZ's object enumeration.
pub struct ApplicationObject {
    application: Arc<Application>,
}

impl ApplicationObject {
    pub fn new(application: Arc<Application>) -> Self {
        Self { application }
    }
}

#[interface(name = "org.freedesktop.DBus.ObjectManager")]
impl ApplicationObject {
    fn get_managed_objects(&self) -> fdo::Result<DbusManagedObjects> {
        info!("📋 GetManagedObjects");
        values::to_dbus_managed_objects(&self.application.managed_objects()).map_err(path_error)
    }
}

pub struct ServiceObject {
    service: Arc<Service>,
}

impl ServiceObject {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[interface(name = "org.bluez.GattService1")]
impl ServiceObject {
    #[zbus(property, name = "UUID")]
    fn uuid(&self) -> String {
        self.service.uuid().to_string()
    }

    #[zbus(property, name = "Primary")]
    fn primary(&self) -> bool {
        self.service.is_primary()
    }

    #[zbus(property, name = "Characteristics")]
    fn characteristics(&self) -> fdo::Result<Vec<OwnedObjectPath>> {
        values::to_object_paths(&self.service.characteristic_paths()).map_err(path_error)
    }
}

pub struct CharacteristicObject {
    characteristic: Arc<dyn Characteristic>,
}

impl CharacteristicObject {
    pub fn new(characteristic: Arc<dyn Characteristic>) -> Self {
        Self { characteristic }
    }
}

#[interface(name = "org.bluez.GattCharacteristic1")]
impl CharacteristicObject {
    fn read_value(&self, options: HashMap<String, OwnedValue>) -> Result<Vec<u8>, BluezError> {
        let options = values::read_options(&options);
        debug!("ReadValue on {} with {:?}", self.characteristic.path(), options);
        Ok(self.characteristic.read_value(&options)?)
    }

    fn write_value(
        &self,
        value: Vec<u8>,
        options: HashMap<String, OwnedValue>,
    ) -> Result<(), BluezError> {
        let options = values::write_options(&options);
        Ok(self.characteristic.write_value(&value, &options)?)
    }

    fn start_notify(&self) -> Result<(), BluezError> {
        Ok(self.characteristic.start_notify()?)
    }

    fn stop_notify(&self) -> Result<(), BluezError> {
        Ok(self.characteristic.stop_notify()?)
    }

    #[zbus(property, name = "UUID")]
    fn uuid(&self) -> String {
        self.characteristic.uuid().to_string()
    }

    #[zbus(property, name = "Service")]
    fn service(&self) -> fdo::Result<OwnedObjectPath> {
        OwnedObjectPath::try_from(self.characteristic.service_path().to_string()).map_err(path_error)
    }

    #[zbus(property, name = "Flags")]
    fn flags(&self) -> Vec<String> {
        self.characteristic.flags()
    }

    #[zbus(property, name = "Descriptors")]
    fn descriptors(&self) -> fdo::Result<Vec<OwnedObjectPath>> {
        values::to_object_paths(&self.characteristic.descriptor_paths()).map_err(path_error)
    }
}

pub struct AdvertisementObject {
    advertisement: Arc<Advertisement>,
}

impl AdvertisementObject {
    pub fn new(advertisement: Arc<Advertisement>) -> Self {
        Self { advertisement }
    }
}

#[interface(name = "org.bluez.LEAdvertisement1")]
impl AdvertisementObject {
    fn release(&self) {
        info!("📴 {}: Released!", self.advertisement.path());
    }

    #[zbus(property, name = "Type")]
    fn ad_type(&self) -> String {
        self.advertisement.ad_type().to_string()
    }

    #[zbus(property, name = "ServiceUUIDs")]
    fn service_uuids(&self) -> Vec<String> {
        crate::peripheral::advertisement::uuid_strings(&self.advertisement.service_uuids)
    }

    #[zbus(property, name = "SolicitUUIDs")]
    fn solicit_uuids(&self) -> Vec<String> {
        crate::peripheral::advertisement::uuid_strings(&self.advertisement.solicit_uuids)
    }

    #[zbus(property, name = "IncludeTxPower")]
    fn include_tx_power(&self) -> bool {
        self.advertisement.include_tx_power
    }
}

pub struct AgentObject {
    agent: PairingAgent,
}

impl AgentObject {
    pub fn new(agent: PairingAgent) -> Self {
        Self { agent }
    }
}

#[interface(name = "org.bluez.Agent1")]
impl AgentObject {
    fn release(&self) {
        self.agent.release();
    }

    fn request_authorization(&self, device: OwnedObjectPath) {
        self.agent.request_authorization(device.as_str());
    }

    fn authorize_service(&self, device: OwnedObjectPath, uuid: String) {
        self.agent.authorize_service(device.as_str(), &uuid);
    }

    fn cancel(&self) {
        self.agent.cancel();
    }
}
