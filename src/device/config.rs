//! Platform endpoints and fixed client parameters.

use crate::network::application::mqtt::QoS;

/// MQTT broker of the SmartLiving platform.
pub const MQTT_BROKER: &str = "broker.smartliving.io";
/// Plain MQTT port of the broker.
pub const MQTT_PORT: u16 = 1883;
/// REST API host of the SmartLiving platform.
pub const API_HOST: &str = "api.smartliving.io";
/// Client identifier the device presents to the broker.
pub const CLIENT_NAME: &str = "WeatherStation";
/// MQTT keep-alive interval.
pub const KEEP_ALIVE_SECONDS: u16 = 30;
/// Content type of asset registration bodies.
pub const CONTENT_TYPE: &str = "application/json";

/// Endpoints and client parameters used by a [`Device`](super::Device).
///
/// `Config::default()` is the production platform. Firmware built against a
/// staging broker overrides the hosts with [`Device::with_config`](super::Device::with_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// MQTT broker host name.
    pub broker_host: &'static str,
    /// MQTT broker port.
    pub broker_port: u16,
    /// REST API host name, optionally with `:port`.
    pub api_host: &'static str,
    /// Client identifier sent in CONNECT.
    pub client_name: &'static str,
    /// Keep-alive interval in seconds.
    pub keep_alive_seconds: u16,
    /// Whether each MQTT connection starts a clean session.
    pub clean_session: bool,
    /// QoS for state publishes and the command subscription.
    pub qos: QoS,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker_host: MQTT_BROKER,
            broker_port: MQTT_PORT,
            api_host: API_HOST,
            client_name: CLIENT_NAME,
            keep_alive_seconds: KEEP_ALIVE_SECONDS,
            clean_session: true,
            qos: QoS::AtMostOnce,
        }
    }
}
