//! Node naming from the station MAC.
//!
//! A GreenGuard node flashed without `GREENGUARD_SENSOR_ID` still has to
//! report under a stable name, so the factory MAC stands in: the node
//! posts as `GG-XXYYZZ` and joins DHCP as `greenguard-xxyyzz`, both
//! built from the NIC-specific half of the address.

use core::fmt::Write;

use crate::config::MAX_SENSOR_ID_LEN;

/// Factory-programmed station MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMac([u8; 6]);

impl NodeMac {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Read the default MAC from eFuse.
    #[cfg(target_os = "espidf")]
    pub fn read() -> Self {
        let mut bytes = [0u8; 6];
        // SAFETY: `bytes` is the 6-byte writable buffer the call expects.
        unsafe {
            esp_idf_svc::sys::esp_efuse_mac_get_default(bytes.as_mut_ptr());
        }
        Self(bytes)
    }

    /// Fixed address so host runs report a predictable name.
    #[cfg(not(target_os = "espidf"))]
    pub fn read() -> Self {
        Self([0x24, 0x6F, 0x28, 0x4A, 0x1B, 0x90])
    }

    /// The three bytes the vendor assigns per device.
    fn nic(&self) -> [u8; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// `sensor_id` used when none was configured at build time.
    pub fn fallback_sensor_id(&self) -> heapless::String<MAX_SENSOR_ID_LEN> {
        let [a, b, c] = self.nic();
        let mut id = heapless::String::new();
        let _ = write!(id, "GG-{a:02X}{b:02X}{c:02X}");
        id
    }

    /// DHCP hostname; lowercase so it is a valid DNS label.
    pub fn hostname(&self) -> heapless::String<24> {
        let [a, b, c] = self.nic();
        let mut name = heapless::String::new();
        let _ = write!(name, "greenguard-{a:02x}{b:02x}{c:02x}");
        name
    }
}
