use uuid::Uuid;

use super::error::GattError;
use super::properties::{self, InterfaceMap, PropertyMap, PropertyValue};
use super::LE_ADVERTISEMENT_IFACE;
use crate::config::PeripheralSettings;

/// `org.bluez.LEAdvertisement1` object at `<path_base><index>`.
#[derive(Debug, Clone)]
pub struct Advertisement {
    path: String,
    ad_type: String,
    pub service_uuids: Vec<Uuid>,
    pub solicit_uuids: Vec<Uuid>,
    pub include_tx_power: bool,
}

impl Advertisement {
    pub fn new(path_base: &str, index: usize, ad_type: &str) -> Self {
        Self {
            path: format!("{}{}", path_base, index),
            ad_type: ad_type.to_string(),
            service_uuids: Vec::new(),
            solicit_uuids: Vec::new(),
            include_tx_power: false,
        }
    }

    /// Advertisement announcing `settings.service_uuid`.
    pub fn from_settings(settings: &PeripheralSettings, index: usize) -> Self {
        let mut advertisement =
            Self::new(&settings.advertisement_path_base, index, &settings.advertisement_type);
        advertisement.service_uuids.push(settings.service_uuid);
        advertisement.include_tx_power = settings.include_tx_power;
        advertisement
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn ad_type(&self) -> &str {
        &self.ad_type
    }

    /// UUID lists are only present when non-empty.
    pub fn properties(&self) -> InterfaceMap {
        let mut props = PropertyMap::new();
        props.insert("Type".to_string(), PropertyValue::Str(self.ad_type.clone()));
        if !self.service_uuids.is_empty() {
            props.insert(
                "ServiceUUIDs".to_string(),
                PropertyValue::Strings(uuid_strings(&self.service_uuids)),
            );
        }
        if !self.solicit_uuids.is_empty() {
            props.insert(
                "SolicitUUIDs".to_string(),
                PropertyValue::Strings(uuid_strings(&self.solicit_uuids)),
            );
        }
        props.insert(
            "IncludeTxPower".to_string(),
            PropertyValue::Bool(self.include_tx_power),
        );

        let mut interfaces = InterfaceMap::new();
        interfaces.insert(LE_ADVERTISEMENT_IFACE.to_string(), props);
        interfaces
    }

    pub fn get_all(&self, interface: &str) -> Result<PropertyMap, GattError> {
        properties::get_all(self.properties(), interface)
    }
}

pub fn uuid_strings(uuids: &[Uuid]) -> Vec<String> {
    uuids.iter().map(|uuid| uuid.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_advertisement() {
        let ad = Advertisement::from_settings(&PeripheralSettings::default(), 0);
        assert_eq!(ad.path(), "/org/bluez/example/advertisement0");

        let props = ad.get_all(LE_ADVERTISEMENT_IFACE).unwrap();
        assert_eq!(props.get("Type"), Some(&PropertyValue::Str("peripheral".to_string())));
        assert_eq!(
            props.get("ServiceUUIDs"),
            Some(&PropertyValue::Strings(vec![
                "12345678-1234-5678-1234-56789abcdef0".to_string()
            ]))
        );
        assert_eq!(props.get("IncludeTxPower"), Some(&PropertyValue::Bool(false)));
        assert!(!props.contains_key("SolicitUUIDs"));
    }

    #[test]
    fn test_optional_fields() {
        let mut ad = Advertisement::new("/test/ad", 2, "broadcast");
        ad.solicit_uuids.push(Uuid::from_u128(1));

        let props = ad.get_all(LE_ADVERTISEMENT_IFACE).unwrap();
        assert_eq!(ad.path(), "/test/ad2");
        assert!(!props.contains_key("ServiceUUIDs"));
        assert_eq!(
            props.get("SolicitUUIDs"),
            Some(&PropertyValue::Strings(vec![
                "00000000-0000-0000-0000-000000000001".to_string()
            ]))
        );
        assert_eq!(props.get("Type"), Some(&PropertyValue::Str("broadcast".to_string())));
    }

    #[test]
    fn test_get_all_rejects_other_interfaces() {
        let ad = Advertisement::from_settings(&PeripheralSettings::default(), 0);
        assert!(matches!(
            ad.get_all("org.bluez.LEAdvertisingManager1"),
            Err(GattError::InvalidArgs(_))
        ));
    }
}
