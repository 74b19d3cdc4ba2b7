use serde::{Deserialize, Serialize};

/// An OS-enumerable serial endpoint. Identity is the stable `id` (port path);
/// everything else is display metadata recreated on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Stable path/handle, e.g. `/dev/ttyACM0` or `COM3`
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// Manufacturer string reported by the OS, if any
    #[serde(default)]
    pub vendor_tag: Option<String>,
}

impl Device {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            vendor_tag: None,
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor_tag = Some(vendor.into());
        self
    }

    /// Case-insensitive substring match against the vendor tag.
    pub fn vendor_matches(&self, needle: &str) -> bool {
        self.vendor_tag
            .as_deref()
            .map(|tag| tag.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false)
    }
}

/// The set of currently attached devices, as observed by one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSet {
    devices: Vec<Device>,
}

impl DeviceSet {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.devices.iter().any(|d| d.id == id)
    }

    /// Order-independent comparison over device ids. Two polls that list the
    /// same ids in a different order are the same set and must not trigger a
    /// change event.
    pub fn same_devices(&self, other: &DeviceSet) -> bool {
        if self.devices.len() != other.devices.len() {
            return false;
        }
        let mut ours: Vec<&str> = self.devices.iter().map(|d| d.id.as_str()).collect();
        let mut theirs: Vec<&str> = other.devices.iter().map(|d| d.id.as_str()).collect();
        ours.sort_unstable();
        theirs.sort_unstable();
        ours == theirs
    }
}

impl FromIterator<Device> for DeviceSet {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
