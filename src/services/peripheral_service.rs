use log::{error, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::main_loop::{LoopExit, LoopHandle, MainLoop};
use crate::bluez::BluetoothStack;
use crate::config::PeripheralSettings;
use crate::devices::{GpsService, SharedLocation};
use crate::peripheral::{
    location_service, Advertisement, Application, Characteristic, LocationCharacteristic,
    PairingAgent,
};
use crate::utils::error::BeaconError;

/// Objects exported by a successful [`PeripheralRegistrar::setup`].
pub struct Peripheral {
    pub adapter: String,
    pub application: Arc<Application>,
    pub characteristic: Arc<LocationCharacteristic>,
    pub advertisement: Arc<Advertisement>,
}

/// Builds the GATT object tree, registers it with the Bluetooth stack and
/// drives the location notifications.
pub struct PeripheralRegistrar<S: BluetoothStack> {
    settings: PeripheralSettings,
    stack: Arc<S>,
}

impl<S: BluetoothStack> PeripheralRegistrar<S> {
    pub fn new(settings: PeripheralSettings, stack: Arc<S>) -> Self {
        Self { settings, stack }
    }

    /// One-time startup: adapter lookup, exports, agent, then the application
    /// and advertisement registrations, submitted on `main_loop`. A failed
    /// registration quits the loop.
    pub async fn setup(
        &self,
        location: SharedLocation,
        main_loop: &LoopHandle,
    ) -> Result<Peripheral, BeaconError> {
        let adapter = self.stack.find_adapter().await?.ok_or_else(|| {
            BeaconError::AdapterNotFound(
                "No adapter exposes org.bluez.LEAdvertisingManager1".to_string(),
            )
        })?;
        info!("📡 Using Bluetooth adapter {}", adapter);

        let (service, characteristic) = location_service(&self.settings, 0, location);
        let mut application = Application::new();
        application.add_service(Arc::new(service));
        let application = Arc::new(application);
        self.stack.export_application(application.clone()).await?;
        info!("🧩 GATT application exported at {}", application.path());

        let agent = PairingAgent::new(&self.settings.agent_path, &self.settings.agent_capability);
        self.stack.register_agent(agent).await?;

        let stack = self.stack.clone();
        let (adapter_path, app_path) = (adapter.clone(), application.path().to_string());
        main_loop.call_async(
            async move { stack.register_application(&adapter_path, &app_path).await },
            |()| info!("✅ GATT application registered"),
            |e, main_loop| {
                error!("❌ Failed to register application: {}", e);
                main_loop.quit(format!("Failed to register application: {}", e));
            },
        );

        let advertisement = Arc::new(Advertisement::from_settings(&self.settings, 0));
        self.stack.export_advertisement(advertisement.clone()).await?;

        let stack = self.stack.clone();
        let (adapter_path, ad_path) = (adapter.clone(), advertisement.path().to_string());
        main_loop.call_async(
            async move { stack.register_advertisement(&adapter_path, &ad_path).await },
            |()| info!("✅ Advertisement registered"),
            |e, main_loop| {
                error!("❌ Failed to register advertisement: {}", e);
                main_loop.quit(format!("Failed to register advertisement: {}", e));
            },
        );

        Ok(Peripheral {
            adapter,
            application,
            characteristic,
            advertisement,
        })
    }

    /// Arms the periodic notification tick for `characteristic`.
    pub fn arm_notifications(
        &self,
        main_loop: &LoopHandle,
        characteristic: Arc<dyn Characteristic>,
    ) -> JoinHandle<()> {
        let stack = self.stack.clone();
        main_loop.timeout_add(self.settings.notify_interval(), move || {
            notify_tick(stack.clone(), characteristic.clone())
        })
    }

    /// Full lifecycle: setup, GPS thread, notification timer, then the loop
    /// until it is quit or interrupted.
    pub async fn run(self, gps: GpsService, location: SharedLocation) -> Result<LoopExit, BeaconError> {
        let main_loop = MainLoop::new();
        let handle = main_loop.handle();

        let peripheral = self.setup(location, &handle).await?;
        gps.start()?;
        self.arm_notifications(&handle, peripheral.characteristic.clone());

        Ok(main_loop.run().await)
    }
}

/// Pushes the current value when someone subscribed. Always keeps the
/// timer armed.
pub async fn notify_tick<S: BluetoothStack + ?Sized>(
    stack: Arc<S>,
    characteristic: Arc<dyn Characteristic>,
) -> bool {
    if let Some(value) = characteristic.pending_notification() {
        if let Err(e) = stack.notify_value_changed(characteristic.path(), value).await {
            warn!("⚠️ Failed to emit notification on {}: {}", characteristic.path(), e);
        }
    }
    true
}
