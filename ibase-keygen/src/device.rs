//! Local machine code.
//!
//! The desktop side shows the user a machine code to paste into the
//! activation form. It is derived from stable host identifiers so it
//! survives reboots but changes when the machine does.
//!
//! Host facts are read once by [`DeviceInfo::collect`]. Hashing a
//! [`DeviceInfo`] only looks at its fields, so a value captured on one host
//! gives the same machine code wherever it is hashed.

use crate::canonical::{DeviceIdentifier, DEVICE_ID_HEX_LEN};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;

/// Separator between identifier components before hashing.
const COMPONENT_SEPARATOR: &str = "|";

/// Hostname recorded when the OS does not report one.
const UNKNOWN_HOSTNAME: &str = "unknown";

/// Descriptive facts about a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Operating system name.
    pub os_name: String,
    /// CPU architecture.
    pub arch: String,
    /// Hostname.
    pub hostname: String,
    /// Platform machine id, if one could be read.
    pub machine_id: Option<String>,
    /// Login name of the user who collected the info.
    #[serde(default)]
    pub user: Option<String>,
}

impl DeviceInfo {
    /// Reads the current host's facts.
    #[must_use]
    pub fn collect() -> Self {
        Self {
            os_name: env::consts::OS.to_string(),
            arch: env::consts::ARCH.to_string(),
            hostname: local_hostname(),
            machine_id: platform::machine_id(),
            user: login_name(),
        }
    }

    /// The non-empty identifier components, in hashing order:
    /// OS, architecture, hostname, machine id, user.
    #[must_use]
    pub fn components(&self) -> Vec<String> {
        [
            Some(&self.os_name),
            Some(&self.arch),
            Some(&self.hostname),
            self.machine_id.as_ref(),
            self.user.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
    }

    /// Hashes the components into a machine code.
    #[must_use]
    pub fn device_identifier(&self) -> DeviceIdentifier {
        identifier_from_components(&self.components())
    }
}

/// Returns the machine code for this host.
#[must_use]
pub fn local_device_identifier() -> DeviceIdentifier {
    DeviceInfo::collect().device_identifier()
}

/// Joins components with `|`, hashes with SHA-256, and keeps the first
/// eight bytes as 16 hex digits.
#[must_use]
pub fn identifier_from_components(components: &[String]) -> DeviceIdentifier {
    let hash = Sha256::digest(components.join(COMPONENT_SEPARATOR).as_bytes());
    DeviceIdentifier::from_raw(&hex::encode_upper(&hash[..DEVICE_ID_HEX_LEN / 2]))
}

fn local_hostname() -> String {
    match hostname::get().map(|name| name.into_string()) {
        Ok(Ok(name)) if !name.trim().is_empty() => name,
        _ => UNKNOWN_HOSTNAME.to_string(),
    }
}

fn login_name() -> Option<String> {
    ["USER", "USERNAME"]
        .into_iter()
        .find_map(|key| env::var(key).ok())
        .filter(|name| !name.trim().is_empty())
}

/// Extracts `IOPlatformUUID` from `ioreg -rd1 -c IOPlatformExpertDevice`.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_ioreg_uuid(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.contains("\"IOPlatformUUID\""))?;
    let (_, value) = line.split_once('=')?;
    let uuid = value.trim().trim_matches('"');
    (!uuid.is_empty()).then(|| uuid.to_string())
}

/// Extracts `MachineGuid` from `reg query ... /v MachineGuid`.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn parse_reg_machine_guid(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("MachineGuid"))?
        .split_whitespace()
        .nth(2)
        .map(str::to_string)
}

#[cfg(target_os = "macos")]
mod platform {
    use std::process::Command;

    pub(super) fn machine_id() -> Option<String> {
        let out = Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()?;
        super::parse_ioreg_uuid(&String::from_utf8_lossy(&out.stdout))
    }
}

#[cfg(target_os = "linux")]
mod platform {
    const MACHINE_ID_PATHS: [&str; 2] = ["/etc/machine-id", "/var/lib/dbus/machine-id"];

    pub(super) fn machine_id() -> Option<String> {
        MACHINE_ID_PATHS.iter().find_map(|path| {
            let id = std::fs::read_to_string(path).ok()?;
            let id = id.trim();
            (!id.is_empty()).then(|| id.to_string())
        })
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use std::process::Command;

    pub(super) fn machine_id() -> Option<String> {
        let out = Command::new("reg")
            .args([
                "query",
                r"HKLM\SOFTWARE\Microsoft\Cryptography",
                "/v",
                "MachineGuid",
            ])
            .output()
            .ok()?;
        super::parse_reg_machine_guid(&String::from_utf8_lossy(&out.stdout))
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
mod platform {
    pub(super) fn machine_id() -> Option<String> {
        None
    }
}
