//! Hardware fingerprint providers.
//!
//! The hardware identity check reads machine values through
//! [`HardwareFingerprintProvider`]. One implementation exists per platform and
//! [`detect_platform`] picks it at startup. Platforms without an
//! implementation get [`UnsupportedPlatform`], which reports nothing and so
//! makes every enabled hardware comparison fail.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reads identifying values from the current machine.
///
/// An empty string means the value could not be read.
pub trait HardwareFingerprintProvider: Send + Sync {
    /// Serial number of the CPU at `index`.
    fn cpu_serial(&self, index: usize) -> String;

    /// Serial number of the disk drive at `index`.
    fn drive_serial(&self, index: usize) -> String;

    /// MAC address of the primary wired interface.
    fn primary_mac_address(&self) -> String;

    /// MAC address of the primary wireless interface.
    fn wireless_mac_address(&self) -> String {
        String::new()
    }

    /// Whether the process runs inside a virtual machine.
    fn is_virtual_machine(&self) -> bool;
}

/// Picks the provider for the platform this binary was built for.
#[must_use]
pub fn detect_platform() -> Arc<dyn HardwareFingerprintProvider> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(SysfsHardware::new())
    }

    #[cfg(not(target_os = "linux"))]
    {
        tracing::warn!(
            os = std::env::consts::OS,
            "no hardware fingerprint provider for this platform, hardware checks will fail"
        );
        Arc::new(UnsupportedPlatform)
    }
}

/// Fail-closed provider for platforms without an implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPlatform;

impl HardwareFingerprintProvider for UnsupportedPlatform {
    fn cpu_serial(&self, _index: usize) -> String {
        String::new()
    }

    fn drive_serial(&self, _index: usize) -> String {
        String::new()
    }

    fn primary_mac_address(&self) -> String {
        String::new()
    }

    fn is_virtual_machine(&self) -> bool {
        false
    }
}

/// Fixed hardware values, for tests and for hosts that gather fingerprints
/// some other way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticHardware {
    pub cpu_serials: Vec<String>,
    pub drive_serials: Vec<String>,
    pub ethernet_mac: String,
    pub wireless_mac: String,
    pub virtual_machine: bool,
}

impl HardwareFingerprintProvider for StaticHardware {
    fn cpu_serial(&self, index: usize) -> String {
        self.cpu_serials.get(index).cloned().unwrap_or_default()
    }

    fn drive_serial(&self, index: usize) -> String {
        self.drive_serials.get(index).cloned().unwrap_or_default()
    }

    fn primary_mac_address(&self) -> String {
        self.ethernet_mac.clone()
    }

    fn wireless_mac_address(&self) -> String {
        self.wireless_mac.clone()
    }

    fn is_virtual_machine(&self) -> bool {
        self.virtual_machine
    }
}

/// Linux provider reading procfs and sysfs.
///
/// The filesystem root is configurable so the provider can be pointed at a
/// captured tree.
#[derive(Debug, Clone)]
pub struct SysfsHardware {
    root: PathBuf,
}

impl Default for SysfsHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsHardware {
    /// Provider for the live system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root("/")
    }

    /// Provider reading `proc/` and `sys/` below `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, relative: impl AsRef<Path>) -> Option<String> {
        fs::read_to_string(self.root.join(relative))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn block_devices(&self) -> Vec<String> {
        sorted_entries(&self.root.join("sys/block"))
            .into_iter()
            .filter(|name| {
                !["loop", "ram", "dm-", "zram", "sr", "md"]
                    .iter()
                    .any(|prefix| name.starts_with(prefix))
            })
            .collect()
    }

    /// Interfaces with a usable hardware address, split into (wired, wireless).
    fn interfaces(&self) -> (Vec<String>, Vec<String>) {
        let net = self.root.join("sys/class/net");
        let mut wired = Vec::new();
        let mut wireless = Vec::new();

        for name in sorted_entries(&net) {
            if name == "lo" {
                continue;
            }
            let Some(address) = self.read(format!("sys/class/net/{name}/address")) else {
                continue;
            };
            let address = normalize_mac(&address);
            if address.is_empty() || address.chars().all(|c| c == '0') {
                continue;
            }
            // Virtual interfaces (bridges, veth, docker) have no device link.
            if !net.join(&name).join("device").exists() {
                continue;
            }
            if net.join(&name).join("wireless").exists() || net.join(&name).join("phy80211").exists()
            {
                wireless.push(address);
            } else {
                wired.push(address);
            }
        }

        (wired, wireless)
    }
}

impl HardwareFingerprintProvider for SysfsHardware {
    fn cpu_serial(&self, index: usize) -> String {
        let serials = self
            .read("proc/cpuinfo")
            .map(|info| parse_cpuinfo_serials(&info))
            .unwrap_or_default();
        if let Some(serial) = serials.get(index) {
            return serial.clone();
        }
        if index == 0 && serials.is_empty() {
            // x86 CPUs do not expose a serial; fall back to the board UUID.
            return self
                .read("sys/class/dmi/id/product_uuid")
                .unwrap_or_default();
        }
        String::new()
    }

    fn drive_serial(&self, index: usize) -> String {
        let Some(device) = self.block_devices().into_iter().nth(index) else {
            return String::new();
        };
        self.read(format!("sys/block/{device}/device/serial"))
            .or_else(|| self.read(format!("sys/block/{device}/device/wwid")))
            .unwrap_or_default()
    }

    fn primary_mac_address(&self) -> String {
        self.interfaces().0.into_iter().next().unwrap_or_default()
    }

    fn wireless_mac_address(&self) -> String {
        self.interfaces().1.into_iter().next().unwrap_or_default()
    }

    fn is_virtual_machine(&self) -> bool {
        let vendor = self.read("sys/class/dmi/id/sys_vendor").unwrap_or_default();
        let product = self
            .read("sys/class/dmi/id/product_name")
            .unwrap_or_default();
        if looks_virtual(&vendor, &product) {
            return true;
        }
        self.read("proc/cpuinfo")
            .is_some_and(|info| cpuinfo_has_hypervisor_flag(&info))
    }
}

/// Extracts `Serial` entries from `/proc/cpuinfo` content.
#[must_use]
pub fn parse_cpuinfo_serials(cpuinfo: &str) -> Vec<String> {
    cpuinfo
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key.trim() == "Serial").then(|| value.trim().to_string())
        })
        .filter(|serial| !serial.is_empty())
        .collect()
}

fn cpuinfo_has_hypervisor_flag(cpuinfo: &str) -> bool {
    cpuinfo.lines().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim() == "flags" && value.split_whitespace().any(|f| f == "hypervisor")
        })
    })
}

/// Recognizes common hypervisors from the system vendor and product name.
#[must_use]
pub fn looks_virtual(vendor: &str, product: &str) -> bool {
    let vendor = vendor.to_ascii_lowercase();
    let product_lower = product.to_ascii_lowercase();

    (vendor == "microsoft corporation" && product_lower.contains("virtual"))
        || vendor.contains("vmware")
        || vendor.contains("innotek")
        || vendor.contains("qemu")
        || vendor.contains("xen")
        || vendor.contains("parallels")
        || product == "VirtualBox"
        || product_lower.contains("kvm")
        || product_lower.starts_with("standard pc")
}

/// Uppercases a MAC address and strips separators, so `00:1a:2b:3c:4d:5e`
/// and `001A2B3C4D5E` compare equal.
#[must_use]
pub fn normalize_mac(address: &str) -> String {
    address
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn sorted_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
