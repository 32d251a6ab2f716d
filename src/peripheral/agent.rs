use log::info;

/// Pairing agent that accepts every request without user interaction.
#[derive(Debug, Clone)]
pub struct PairingAgent {
    path: String,
    capability: String,
}

impl PairingAgent {
    pub fn new(path: &str, capability: &str) -> Self {
        Self {
            path: path.to_string(),
            capability: capability.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    pub fn release(&self) {
        info!("🔑 Agent Release");
    }

    pub fn request_authorization(&self, device: &str) {
        info!("🔑 RequestAuthorization ({})", device);
    }

    pub fn authorize_service(&self, device: &str, uuid: &str) {
        info!("🔑 AuthorizeService ({}, {})", device, uuid);
    }

    pub fn cancel(&self) {
        info!("🔑 Agent Cancel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_accepts_everything() {
        let agent = PairingAgent::new("/test/agent", "NoInputNoOutput");
        assert_eq!(agent.path(), "/test/agent");
        assert_eq!(agent.capability(), "NoInputNoOutput");

        agent.request_authorization("/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF");
        agent.authorize_service(
            "/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF",
            "12345678-1234-5678-1234-56789abcdef0",
        );
        agent.cancel();
        agent.release();
    }
}
