//! WiFi station driver seam.
//!
//! Associating with an access point is entirely the driver's business (an
//! ESP8266 bridge, `esp-wifi`, a modem). The device only needs the stream of
//! status notifications the driver produces while it is being pumped, which
//! is what [`Wifi::process`] hands back.

use heapless::Vec;

/// Maximum number of arguments carried by one driver notification.
pub const MAX_RESPONSE_ARGS: usize = 4;

/// Station status codes as reported by ESP-family WiFi firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStatus {
    /// Station is idle.
    Idle,
    /// Association in progress.
    Connecting,
    /// Access point rejected the password.
    WrongPassword,
    /// Configured access point was not found.
    NoApFound,
    /// Association failed for another reason.
    ConnectFail,
    /// Station is associated and has been assigned an address.
    GotIp,
    /// A code this crate does not know about.
    Unknown(u32),
}

impl StationStatus {
    /// Decodes a raw status code.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => StationStatus::Idle,
            1 => StationStatus::Connecting,
            2 => StationStatus::WrongPassword,
            3 => StationStatus::NoApFound,
            4 => StationStatus::ConnectFail,
            5 => StationStatus::GotIp,
            other => StationStatus::Unknown(other),
        }
    }

    /// Raw code of this status.
    pub fn code(self) -> u32 {
        match self {
            StationStatus::Idle => 0,
            StationStatus::Connecting => 1,
            StationStatus::WrongPassword => 2,
            StationStatus::NoApFound => 3,
            StationStatus::ConnectFail => 4,
            StationStatus::GotIp => 5,
            StationStatus::Unknown(code) => code,
        }
    }
}

/// One notification from the WiFi driver.
///
/// Drivers report status changes with a variable argument list. A status
/// change carries exactly one argument, the station status code; anything
/// else is not a status notification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    /// Raw arguments in the order the driver sent them.
    pub args: Vec<u32, MAX_RESPONSE_ARGS>,
}

impl Response {
    /// Builds a status notification carrying a single status code.
    pub fn status(status: StationStatus) -> Self {
        let mut args = Vec::new();
        // capacity is at least one
        let _ = args.push(status.code());
        Self { args }
    }

    /// Number of arguments carried.
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// The station status, if this notification has exactly one argument.
    pub fn station_status(&self) -> Option<StationStatus> {
        match self.args.as_slice() {
            [code] => Some(StationStatus::from_code(*code)),
            _ => None,
        }
    }
}

/// A WiFi driver that can be pumped from the device's control loop.
pub trait Wifi {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Runs the driver's internal processing once and returns the next
    /// pending notification, if any.
    ///
    /// Callers drain the driver by calling this until it returns `Ok(None)`.
    fn process(&mut self) -> Result<Option<Response>, Self::Error>;
}
