use rodio::{
    cpal::{default_host, traits::HostTrait},
    Device, DeviceTrait,
};

pub fn output_device() -> Option<(Device, String)> {
    let device = default_host().default_output_device()?;
    let name = device.name().unwrap_or_else(|_| "unknown device".to_owned());

    Some((device, name))
}
