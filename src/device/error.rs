//! Error type for device operations

/// Errors surfaced by [`Device`](super::Device).
///
/// Failures of the underlying drivers are not classified further; the
/// variant only says which collaborator failed. Details go to the logging
/// handler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The MQTT client rejected its setup during [`connect`](super::Device::connect).
    ///
    /// This is a boot-time misconfiguration. The device is left unconfigured
    /// and there is no recovery path; firmware should halt.
    MqttSetup,
    /// The MQTT client failed to publish, subscribe or poll.
    Mqtt,
    /// The REST client failed to configure or complete a request.
    Rest,
    /// The WiFi driver failed while being pumped.
    Wifi,
    /// The asset document did not fit its buffer.
    Serialize,
    /// A topic, payload, path, header or identifier exceeded its capacity.
    BufferOverflow,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Error::MqttSetup => "unable to set up MQTT client",
            Error::Mqtt => "MQTT client error",
            Error::Rest => "REST client error",
            Error::Wifi => "WiFi driver error",
            Error::Serialize => "asset document too large",
            Error::BufferOverflow => "buffer overflow",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::MqttSetup => defmt::write!(f, "MqttSetup"),
            Error::Mqtt => defmt::write!(f, "Mqtt"),
            Error::Rest => defmt::write!(f, "Rest"),
            Error::Wifi => defmt::write!(f, "Wifi"),
            Error::Serialize => defmt::write!(f, "Serialize"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
        }
    }
}
