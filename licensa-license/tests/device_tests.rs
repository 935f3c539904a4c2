use licensa_license::{
    HardwareFingerprintProvider, StaticHardware, SysfsHardware, UnsupportedPlatform,
    detect_platform,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn touch_dir(root: &Path, relative: &str) {
    fs::create_dir_all(root.join(relative)).unwrap();
}

/// A captured Linux tree: one NVMe disk, a loop device, a wired and a
/// wireless NIC, a bridge and loopback.
fn fake_linux() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, "proc/cpuinfo", "processor\t: 0\nflags\t\t: fpu vme sse2\n");
    write(root, "sys/class/dmi/id/product_uuid", "4c4c4544-0042-3510-8051-b4c04f564732\n");
    write(root, "sys/class/dmi/id/sys_vendor", "Dell Inc.\n");
    write(root, "sys/class/dmi/id/product_name", "Precision 5570\n");

    write(root, "sys/block/loop0/device/serial", "LOOPSERIAL\n");
    write(root, "sys/block/nvme0n1/device/serial", "  S4EVNX0N123456  \n");

    write(root, "sys/class/net/lo/address", "00:00:00:00:00:00\n");
    write(root, "sys/class/net/br0/address", "02:42:ac:11:00:01\n");
    write(root, "sys/class/net/enp0s31f6/address", "00:1a:2b:3c:4d:5e\n");
    touch_dir(root, "sys/class/net/enp0s31f6/device");
    write(root, "sys/class/net/wlp2s0/address", "a4:5e:60:e1:22:33\n");
    touch_dir(root, "sys/class/net/wlp2s0/device");
    touch_dir(root, "sys/class/net/wlp2s0/wireless");

    dir
}

#[test]
fn sysfs_cpu_serial_falls_back_to_board_uuid() {
    let tree = fake_linux();
    let hw = SysfsHardware::with_root(tree.path());
    assert_eq!(hw.cpu_serial(0), "4c4c4544-0042-3510-8051-b4c04f564732");
    assert_eq!(hw.cpu_serial(1), "");
}

#[test]
fn sysfs_cpu_serial_prefers_cpuinfo() {
    let tree = fake_linux();
    write(
        tree.path(),
        "proc/cpuinfo",
        "processor\t: 0\nHardware\t: BCM2835\nSerial\t\t: 10000000abcdef01\n",
    );
    let hw = SysfsHardware::with_root(tree.path());
    assert_eq!(hw.cpu_serial(0), "10000000abcdef01");
}

#[test]
fn sysfs_drive_serial_skips_loop_devices() {
    let tree = fake_linux();
    let hw = SysfsHardware::with_root(tree.path());
    assert_eq!(hw.drive_serial(0), "S4EVNX0N123456");
    assert_eq!(hw.drive_serial(1), "");
}

#[test]
fn sysfs_mac_addresses_split_wired_and_wireless() {
    let tree = fake_linux();
    let hw = SysfsHardware::with_root(tree.path());
    assert_eq!(hw.primary_mac_address(), "001A2B3C4D5E");
    assert_eq!(hw.wireless_mac_address(), "A45E60E12233");
}

#[test]
fn sysfs_physical_machine() {
    let tree = fake_linux();
    assert!(!SysfsHardware::with_root(tree.path()).is_virtual_machine());
}

#[test]
fn sysfs_detects_hypervisor_vendor() {
    let tree = fake_linux();
    write(tree.path(), "sys/class/dmi/id/sys_vendor", "QEMU\n");
    write(
        tree.path(),
        "sys/class/dmi/id/product_name",
        "Standard PC (Q35 + ICH9, 2009)\n",
    );
    assert!(SysfsHardware::with_root(tree.path()).is_virtual_machine());
}

#[test]
fn sysfs_detects_hypervisor_cpu_flag() {
    let tree = fake_linux();
    write(tree.path(), "proc/cpuinfo", "processor\t: 0\nflags\t\t: fpu hypervisor\n");
    assert!(SysfsHardware::with_root(tree.path()).is_virtual_machine());
}

#[test]
fn sysfs_empty_tree_reports_nothing() {
    let dir = TempDir::new().unwrap();
    let hw = SysfsHardware::with_root(dir.path());
    assert_eq!(hw.cpu_serial(0), "");
    assert_eq!(hw.drive_serial(0), "");
    assert_eq!(hw.primary_mac_address(), "");
    assert_eq!(hw.wireless_mac_address(), "");
    assert!(!hw.is_virtual_machine());
}

#[test]
fn static_hardware_indexes() {
    let hw = StaticHardware {
        cpu_serials: vec!["A".into(), "B".into()],
        ..StaticHardware::default()
    };
    assert_eq!(hw.cpu_serial(1), "B");
    assert_eq!(hw.cpu_serial(2), "");
    assert_eq!(hw.drive_serial(0), "");
}

#[test]
fn unsupported_platform_is_fail_closed() {
    let hw = UnsupportedPlatform;
    assert_eq!(hw.cpu_serial(0), "");
    assert_eq!(hw.primary_mac_address(), "");
    assert!(!hw.is_virtual_machine());
}

#[test]
fn detect_platform_never_panics() {
    let hw = detect_platform();
    let _ = hw.cpu_serial(0);
    let _ = hw.drive_serial(0);
    let _ = hw.primary_mac_address();
    let _ = hw.is_virtual_machine();
}
