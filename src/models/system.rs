use std::fmt;

use chrono::Duration;
use serde::Deserialize;
use serde_json::value::RawValue;

use super::{decode_body, lenient_opt_u64, lenient_u64};
use crate::{Error, Result};

/// Device identity and software details, from `show version`
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub hostname: String,
    pub processor_board_id: String,
    pub kickstart_image_version: String,
    /// Time since the kernel booted
    pub uptime: Duration,
    pub bios_version: Option<String>,
    pub system_image_version: Option<String>,
    pub chassis: Option<String>,
    /// Installed memory, in the unit reported by `memory_type`
    pub memory: Option<u64>,
    pub memory_type: Option<String>,
}

#[derive(Deserialize)]
struct VersionBody {
    host_name: String,
    proc_board_id: String,
    #[serde(default)]
    kickstart_ver_str: Option<String>,
    #[serde(default)]
    nxos_ver_str: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    kern_uptm_days: u64,
    #[serde(deserialize_with = "lenient_u64")]
    kern_uptm_hrs: u64,
    #[serde(deserialize_with = "lenient_u64")]
    kern_uptm_mins: u64,
    #[serde(deserialize_with = "lenient_u64")]
    kern_uptm_secs: u64,
    #[serde(default)]
    bios_ver_str: Option<String>,
    #[serde(default)]
    sys_ver_str: Option<String>,
    #[serde(default)]
    chassis_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    memory: Option<u64>,
    #[serde(default)]
    mem_type: Option<String>,
}

impl SystemInfo {
    /// Parse the `result` payload of a `show version` command.
    ///
    /// Older images report the version as `kickstart_ver_str`, newer
    /// single-image releases only carry `nxos_ver_str`.
    pub fn from_payload(payload: &RawValue) -> Result<Self> {
        let body: VersionBody = decode_body(payload)?;
        let kickstart_image_version = body
            .kickstart_ver_str
            .or(body.nxos_ver_str)
            .ok_or_else(|| Error::parse("no kickstart image version", payload.get()))?;
        let uptime = uptime(
            body.kern_uptm_days,
            body.kern_uptm_hrs,
            body.kern_uptm_mins,
            body.kern_uptm_secs,
        )
        .ok_or_else(|| Error::parse("uptime out of range", payload.get()))?;

        Ok(SystemInfo {
            hostname: body.host_name,
            processor_board_id: body.proc_board_id,
            kickstart_image_version,
            uptime,
            bios_version: body.bios_ver_str,
            system_image_version: body.sys_ver_str,
            chassis: body.chassis_id,
            memory: body.memory,
            memory_type: body.mem_type,
        })
    }

    #[inline]
    pub fn uptime_seconds(&self) -> i64 {
        self.uptime.num_seconds()
    }
}

fn uptime(days: u64, hours: u64, minutes: u64, seconds: u64) -> Option<Duration> {
    let days = Duration::try_days(i64::try_from(days).ok()?)?;
    let hours = Duration::try_hours(i64::try_from(hours).ok()?)?;
    let minutes = Duration::try_minutes(i64::try_from(minutes).ok()?)?;
    let seconds = Duration::try_seconds(i64::try_from(seconds).ok()?)?;
    days.checked_add(&hours)?
        .checked_add(&minutes)?
        .checked_add(&seconds)
}

impl fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hostname: {}", self.hostname)?;
        writeln!(f, "Processor Board ID: {}", self.processor_board_id)?;
        writeln!(f, "Kickstart Image Version: {}", self.kickstart_image_version)?;
        write!(f, "Uptime: {}", self.uptime_seconds())
    }
}
