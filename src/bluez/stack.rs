use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use zbus::zvariant::{self, ObjectPath, OwnedValue, Value};
use zbus::{Connection, Interface};

use super::interfaces::{
    AdvertisementObject, AgentObject, ApplicationObject, CharacteristicObject, ServiceObject,
};
use super::properties::PropertiesObject;
use super::proxies::{AgentManagerProxy, GattManagerProxy, LEAdvertisingManagerProxy};
use super::{BLUEZ_SERVICE_NAME, LE_ADVERTISING_MANAGER_IFACE, PROPERTIES_IFACE};
use crate::peripheral::{Advertisement, Application, InterfaceMap, PairingAgent, GATT_CHRC_IFACE};
use crate::utils::error::BeaconError;

/// Everything the registrar needs from the Bluetooth stack.
#[async_trait]
pub trait BluetoothStack: Send + Sync + 'static {
    /// Object path of an adapter that can advertise, if any.
    async fn find_adapter(&self) -> Result<Option<String>, BeaconError>;

    /// Exports the application root plus every service and characteristic.
    async fn export_application(&self, application: Arc<Application>) -> Result<(), BeaconError>;

    async fn export_advertisement(&self, advertisement: Arc<Advertisement>) -> Result<(), BeaconError>;

    /// Exports the agent, registers it and makes it the default agent.
    async fn register_agent(&self, agent: PairingAgent) -> Result<(), BeaconError>;

    async fn register_application(&self, adapter: &str, application_path: &str) -> Result<(), BeaconError>;

    async fn register_advertisement(&self, adapter: &str, advertisement_path: &str) -> Result<(), BeaconError>;

    /// Emits `PropertiesChanged` with the new `Value` of a characteristic.
    async fn notify_value_changed(&self, characteristic_path: &str, value: Vec<u8>) -> Result<(), BeaconError>;
}

/// Picks the lexicographically first object exposing the advertising manager.
pub fn select_adapter<I, S>(objects: I) -> Option<String>
where
    I: IntoIterator<Item = (String, Vec<S>)>,
    S: AsRef<str>,
{
    objects
        .into_iter()
        .filter(|(_, interfaces)| {
            interfaces
                .iter()
                .any(|iface| iface.as_ref() == LE_ADVERTISING_MANAGER_IFACE)
        })
        .map(|(path, _)| path)
        .min()
}

/// `(interface, changed, invalidated)` arguments of `PropertiesChanged`.
pub type PropertiesChangedBody = (String, HashMap<String, OwnedValue>, Vec<String>);

/// `PropertiesChanged` arguments announcing a new characteristic `Value`.
pub fn value_changed_body(value: Vec<u8>) -> Result<PropertiesChangedBody, zvariant::Error> {
    let mut changed = HashMap::new();
    changed.insert("Value".to_string(), OwnedValue::try_from(Value::from(value))?);
    Ok((GATT_CHRC_IFACE.to_string(), changed, Vec::new()))
}

fn registration_error(call: &str, target: &str, err: impl Display) -> BeaconError {
    BeaconError::RegistrationError(format!("{} {}: {}", call, target, err))
}

/// [`BluetoothStack`] backed by BlueZ on the system bus.
pub struct BluezStack {
    connection: Connection,
}

impl BluezStack {
    pub async fn system() -> Result<Self, BeaconError> {
        let connection = Connection::system().await?;
        info!("🔌 Connected to the system bus");
        Ok(Self::new(connection))
    }

    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Exports `iface` at `path` with its Properties interface answered by
    /// `interfaces`.
    async fn export<I, F>(&self, path: &str, iface: I, interfaces: F) -> Result<(), BeaconError>
    where
        I: Interface,
        F: Fn() -> InterfaceMap + Send + Sync + 'static,
    {
        let server = self.connection.object_server();
        server.at(path, iface).await?;
        server.remove::<zbus::fdo::Properties, _>(path).await?;
        server.at(path, PropertiesObject::new(interfaces)).await?;
        Ok(())
    }
}

#[async_trait]
impl BluetoothStack for BluezStack {
    async fn find_adapter(&self) -> Result<Option<String>, BeaconError> {
        let manager = zbus::fdo::ObjectManagerProxy::builder(&self.connection)
            .destination(BLUEZ_SERVICE_NAME)?
            .path("/")?
            .build()
            .await?;
        let objects = manager.get_managed_objects().await?;

        let candidates = objects.into_iter().map(|(path, interfaces)| {
            let names: Vec<String> = interfaces.keys().map(|name| name.to_string()).collect();
            (path.to_string(), names)
        });
        Ok(select_adapter(candidates))
    }

    async fn export_application(&self, application: Arc<Application>) -> Result<(), BeaconError> {
        for service in application.services() {
            for characteristic in service.characteristics() {
                debug!("Exporting characteristic {}", characteristic.path());
                let source = characteristic.clone();
                self.export(
                    characteristic.path(),
                    CharacteristicObject::new(characteristic.clone()),
                    move || source.properties(),
                )
                .await?;
            }
            debug!("Exporting service {}", service.path());
            let source = service.clone();
            self.export(
                service.path(),
                ServiceObject::new(service.clone()),
                move || source.properties(),
            )
            .await?;
        }
        let path = application.path().to_string();
        self.connection
            .object_server()
            .at(path.as_str(), ApplicationObject::new(application))
            .await?;
        Ok(())
    }

    async fn export_advertisement(&self, advertisement: Arc<Advertisement>) -> Result<(), BeaconError> {
        let path = advertisement.path().to_string();
        debug!("Exporting advertisement {}", path);
        let source = advertisement.clone();
        self.export(
            path.as_str(),
            AdvertisementObject::new(advertisement),
            move || source.properties(),
        )
        .await
    }

    async fn register_agent(&self, agent: PairingAgent) -> Result<(), BeaconError> {
        let agent_path = agent.path().to_string();
        let capability = agent.capability().to_string();
        self.connection
            .object_server()
            .at(agent_path.as_str(), AgentObject::new(agent))
            .await?;

        let path = ObjectPath::try_from(agent_path.as_str())?;

        let manager = AgentManagerProxy::new(&self.connection).await?;
        manager
            .register_agent(&path, &capability)
            .await
            .map_err(|err| registration_error("RegisterAgent", &agent_path, err))?;
        manager
            .request_default_agent(&path)
            .await
            .map_err(|err| registration_error("RequestDefaultAgent", &agent_path, err))?;
        info!("🔑 Agent registered at {} ({})", path, capability);
        Ok(())
    }

    async fn register_application(&self, adapter: &str, application_path: &str) -> Result<(), BeaconError> {
        let manager = GattManagerProxy::builder(&self.connection)
            .path(adapter)?
            .build()
            .await?;
        let path = ObjectPath::try_from(application_path)?;
        manager
            .register_application(&path, HashMap::new())
            .await
            .map_err(|err| registration_error("RegisterApplication", application_path, err))?;
        Ok(())
    }

    async fn register_advertisement(&self, adapter: &str, advertisement_path: &str) -> Result<(), BeaconError> {
        let manager = LEAdvertisingManagerProxy::builder(&self.connection)
            .path(adapter)?
            .build()
            .await?;
        let path = ObjectPath::try_from(advertisement_path)?;
        manager
            .register_advertisement(&path, HashMap::new())
            .await
            .map_err(|err| registration_error("RegisterAdvertisement", advertisement_path, err))?;
        Ok(())
    }

    async fn notify_value_changed(&self, characteristic_path: &str, value: Vec<u8>) -> Result<(), BeaconError> {
        let body = value_changed_body(value)?;
        self.connection
            .emit_signal(
                None::<&str>,
                characteristic_path,
                PROPERTIES_IFACE,
                "PropertiesChanged",
                &body,
            )
            .await?;
        Ok(())
    }
}
