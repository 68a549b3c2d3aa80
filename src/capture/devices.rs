//! Audio input device selection.
//!
//! Resolves the configured device spec ("default", a numeric index, or a
//! device name) to a cpal device, with ALSA stderr noise suppressed on Linux.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Resolves an input device from a device spec.
///
/// `spec` is "default" for the system default device, a numeric index from
/// `wavi list-devices`, or a device name.
pub fn resolve_input_device(spec: &str) -> Result<cpal::Device> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();

        if spec == "default" {
            return host
                .default_input_device()
                .ok_or_else(|| anyhow!("No audio input device available"));
        }

        let devices: Vec<cpal::Device> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if let Ok(index) = spec.parse::<usize>() {
            return devices.into_iter().nth(index).ok_or_else(|| {
                anyhow!("Device index {index} is out of range. Run 'wavi list-devices'.")
            });
        }

        devices
            .into_iter()
            .find(|d| d.name().map(|n| n == spec).unwrap_or(false))
            .ok_or_else(|| {
                anyhow!("Audio input device '{spec}' not found. Run 'wavi list-devices'.")
            })
    })
}

/// Enumerates input devices that can at least report a name.
///
/// Returns the devices together with the default device's name, if any.
pub fn usable_input_devices() -> Result<(Vec<cpal::Device>, Option<String>)> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let devices: Vec<cpal::Device> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?
            .filter(|d| d.name().is_ok())
            .collect();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());
        Ok((devices, default_name))
    })
}

/// Temporarily redirects stderr to /dev/null while `f` runs, hiding ALSA
/// library warnings on Linux.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;
    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    if unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// ALSA does not exist off Linux, so no suppression is needed.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
