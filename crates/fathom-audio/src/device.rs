//! Audio output device enumeration and stream construction via cpal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, Stream};

use crate::bridge::AudioBridge;
use crate::error::AudioError;

/// Information about one audio output device.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Device name as reported by the host.
    pub name: String,
    /// Default output sample rate, in hertz.
    pub default_sample_rate: u32,
}

/// Lists every available audio output device.
pub fn list_output_devices() -> Result<Vec<AudioDevice>, AudioError> {
    let host = cpal::default_host();
    let devices = host.output_devices()?;

    Ok(devices
        .filter_map(|device| {
            let name = device.name().ok()?;
            let default_sample_rate = device
                .default_output_config()
                .map(|c| c.sample_rate().0)
                .unwrap_or(48_000);
            Some(AudioDevice { name, default_sample_rate })
        })
        .collect())
}

/// Returns the host's default output device, if any.
pub fn default_output_device() -> Option<AudioDevice> {
    let host = cpal::default_host();
    let device = host.default_output_device()?;
    let name = device.name().ok()?;
    let default_sample_rate = device
        .default_output_config()
        .map(|c| c.sample_rate().0)
        .unwrap_or(48_000);
    Some(AudioDevice { name, default_sample_rate })
}

/// Finds an output device by exact name, case-insensitive substring, or
/// numeric index into [`list_output_devices`]'s order.
pub fn find_output_device(spec: &str) -> Result<Device, AudioError> {
    let host = cpal::default_host();

    if let Ok(index) = spec.parse::<usize>() {
        let device = host
            .output_devices()?
            .nth(index)
            .ok_or_else(|| AudioError::DeviceNotFound(spec.to_string()))?;
        return Ok(device);
    }

    let needle = spec.to_lowercase();
    host.output_devices()?
        .find(|d| d.name().map(|n| n.to_lowercase().contains(&needle)).unwrap_or(false))
        .ok_or_else(|| AudioError::DeviceNotFound(spec.to_string()))
}

/// A running output-only audio stream driven by an [`AudioBridge`]'s
/// callback. Dropping this stops playback.
pub struct AudioOutputStream {
    _host: Host,
    _device: Device,
    _stream: Stream,
}

impl AudioOutputStream {
    /// Opens the named device (or the default, if `device_name` is `None`)
    /// and starts playback driven by `bridge`'s callback.
    pub fn open(device_name: Option<&str>, bridge: &AudioBridge) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(name) => find_output_device(name)?,
            None => host.default_output_device().ok_or(AudioError::NoDevice)?,
        };

        let config = device.default_output_config()?;
        let mut callback = bridge.build_callback();

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                callback(data);
            },
            |err| tracing::warn!(%err, "audio output stream error"),
            None,
        )?;
        stream.play()?;

        Ok(Self { _host: host, _device: device, _stream: stream })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_devices_does_not_panic() {
        let _ = list_output_devices();
    }

    #[test]
    fn default_device_does_not_panic() {
        let _ = default_output_device();
    }
}
