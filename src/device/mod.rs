//! # SmartLiving device
//!
//! [`Device`] connects a WiFi weather station to the SmartLiving platform.
//! It owns three collaborators, a [`Wifi`] driver, an [`MqttSession`] and a
//! [`Rest`] client, and translates between them and the application:
//!
//! - [`Device::add_asset`] registers a sensor or actuator with one REST `PUT`.
//! - [`Device::send`] publishes an asset's new state over MQTT.
//! - Commands for the device's actuators arrive over MQTT and are handed to
//!   the command handler as [`Command`] values.
//!
//! Everything runs on the caller's control loop: [`Device::process`] pumps
//! the WiFi driver and the MQTT session and dispatches their events inline.
//!
//! ## Connection state
//!
//! The device tracks one flag. It turns on when the WiFi driver reports that
//! the station got an address, which also opens the MQTT connection. Any
//! other status report turns it off and closes the MQTT connection. There
//! is no intermediate state and no automatic reconnect.
//!
//! ```rust,ignore
//! let info = DeviceInfo::new(DEVICE_ID, CLIENT_ID, CLIENT_KEY)?;
//! let mut device = Device::new(wifi, Session::new(tcp), RestClient::new(tcp), info);
//!
//! let mut on_command = |command: &Command| set_led(command.value == "true");
//! device.set_command_handler(&mut on_command);
//! device.set_auto_echo(true);
//!
//! // A setup failure is a boot-time misconfiguration.
//! device.connect().expect("MQTT client setup");
//! device.add_asset("temp", AssetType::Sensor, "number")?;
//!
//! loop {
//!     device.process()?;
//!     if device.is_connected() && timer.expired() {
//!         device.send("temp", &reading)?;
//!     }
//! }
//! ```

pub mod asset;
pub mod config;
pub mod error;
pub mod topic;

pub use asset::{AssetDefinition, AssetType, Profile};
pub use config::Config;
pub use error::Error;

use crate::network::application::http::{Header, Rest};
use crate::network::application::mqtt::{self, Event, MqttSession, PublishPacket, Setup, session};
use crate::network::wifi::{Response, StationStatus, Wifi};
use core::fmt::{self, Write};
use heapless::String;

/// Maximum length of each [`DeviceInfo`] identifier.
pub const MAX_ID_LEN: usize = 64;
/// Maximum asset name length of an inbound command.
pub const MAX_ASSET_NAME_LEN: usize = 32;
/// Maximum value length of an inbound command.
pub const MAX_VALUE_LEN: usize = 256;
/// Maximum length of a formatted log line; longer lines are cut short.
pub const MAX_LOG_LEN: usize = 320;

/// Forwards a formatted line to the device's logging sinks.
macro_rules! log {
    ($device:expr, $($arg:tt)*) => {
        $device.log(format_args!($($arg)*))
    };
}

/// Identity of the device on the platform.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    device_id: String<MAX_ID_LEN>,
    client_id: String<MAX_ID_LEN>,
    client_key: String<MAX_ID_LEN>,
}

impl DeviceInfo {
    /// Copies the identifiers, failing if any exceeds [`MAX_ID_LEN`].
    pub fn new(device_id: &str, client_id: &str, client_key: &str) -> Result<Self, Error> {
        let copy = |s: &str| String::try_from(s).map_err(|_| Error::BufferOverflow);
        Ok(Self {
            device_id: copy(device_id)?,
            client_id: copy(client_id)?,
            client_key: copy(client_key)?,
        })
    }

    /// Device identifier.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Client (account) identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client (account) secret key.
    pub fn client_key(&self) -> &str {
        &self.client_key
    }
}

impl fmt::Debug for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceInfo")
            .field("device_id", &self.device_id)
            .field("client_id", &self.client_id)
            .field("client_key", &"<redacted>")
            .finish()
    }
}

/// A command received for one of the device's assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Asset name, local to the device.
    pub name: String<MAX_ASSET_NAME_LEN>,
    /// Raw command value as sent by the platform.
    pub value: String<MAX_VALUE_LEN>,
}

impl Command {
    /// Copies name and value, failing if either exceeds its capacity.
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::BufferOverflow)?,
            value: String::try_from(value).map_err(|_| Error::BufferOverflow)?,
        })
    }
}

/// Handler for inbound commands.
pub type CommandHandler<'h> = &'h mut dyn FnMut(&Command);
/// Handler invoked when WiFi reports an address, before MQTT connects.
pub type ConnectHandler<'h> = &'h mut dyn FnMut();
/// Sink for debug log lines.
pub type LoggingHandler<'h> = &'h mut dyn FnMut(&str);

/// A device on the SmartLiving platform.
pub struct Device<'h, W, M, R> {
    wifi: W,
    mqtt: M,
    rest: R,
    info: DeviceInfo,
    config: Config,
    started: bool,
    wifi_connected: bool,
    auto_echo: bool,
    on_command: Option<CommandHandler<'h>>,
    on_connect: Option<ConnectHandler<'h>>,
    on_log: Option<LoggingHandler<'h>>,
}

impl<'h, W, M, R> Device<'h, W, M, R>
where
    W: Wifi,
    M: MqttSession,
    R: Rest,
{
    /// Creates a device for the production platform.
    pub fn new(wifi: W, mqtt: M, rest: R, info: DeviceInfo) -> Self {
        Self::with_config(wifi, mqtt, rest, info, Config::default())
    }

    /// Creates a device with custom endpoints or client parameters.
    pub fn with_config(wifi: W, mqtt: M, rest: R, info: DeviceInfo, config: Config) -> Self {
        Self {
            wifi,
            mqtt,
            rest,
            info,
            config,
            started: false,
            wifi_connected: false,
            auto_echo: false,
            on_command: None,
            on_connect: None,
            on_log: None,
        }
    }

    /// Configures the MQTT and REST clients and starts dispatching events.
    ///
    /// The MQTT client identifies as [`Config::client_name`] with user
    /// `{clientId}:{clientId}` and the client key as password. The broker
    /// connection itself opens once WiFi reports an address.
    ///
    /// # Errors
    ///
    /// [`Error::MqttSetup`] if the MQTT client rejects its setup. This is not
    /// recoverable; the device stays unconfigured.
    pub fn connect(&mut self) -> Result<(), Error> {
        let mut user: String<{ 2 * MAX_ID_LEN + 1 }> = String::new();
        write!(user, "{}:{}", self.info.client_id(), self.info.client_id())
            .map_err(|_| Error::BufferOverflow)?;

        self.log_str("Setting up MQTT client...");
        let setup = Setup {
            client_id: self.config.client_name,
            username: &user,
            password: self.info.client_key(),
            keep_alive_seconds: self.config.keep_alive_seconds,
            clean_session: self.config.clean_session,
        };
        if let Err(err) = self.mqtt.begin(&setup) {
            log!(self, "Unable to set up MQTT client: {:?}", err);
            return Err(Error::MqttSetup);
        }

        self.rest.begin(self.config.api_host).map_err(|_| Error::Rest)?;
        self.rest
            .set_content_type(config::CONTENT_TYPE)
            .map_err(|_| Error::Rest)?;

        self.log_str("Setting up WIFI...");
        self.started = true;
        Ok(())
    }

    /// Publishes the state of asset `name` stamped with server time.
    pub fn send(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.send_with_timestamp(name, value, 0)
    }

    /// Publishes the state of asset `name` with an explicit Unix timestamp.
    ///
    /// A zero timestamp lets the platform use its own clock.
    pub fn send_with_timestamp(&mut self, name: &str, value: &str, timestamp: u64) -> Result<(), Error> {
        let topic = topic::state_topic(&self.info, name)?;
        let payload = topic::state_payload(timestamp, value)?;
        self.mqtt
            .publish(&topic, payload.as_bytes(), self.config.qos)
            .map_err(|_| Error::Mqtt)
    }

    /// Registers an asset with the platform.
    ///
    /// Issues `PUT /device/{deviceId}/asset/{name}` authenticated with the
    /// client id and key. The response body goes to the logging handler and
    /// the status code is returned as is; a rejected registration is not an
    /// error here.
    pub fn add_asset(&mut self, name: &str, kind: AssetType, profile_type: &str) -> Result<u16, Error> {
        let mut body = [0u8; asset::MAX_BODY_LEN];
        let len = AssetDefinition::new(name, kind, profile_type).to_json(&mut body)?;
        let body = &body[..len];

        let mut content_length: String<10> = String::new();
        write!(content_length, "{}", len).map_err(|_| Error::BufferOverflow)?;

        let header = |name: &str, value: &str| Header::new(name, value).map_err(|_| Error::BufferOverflow);
        let headers = [
            header("Auth-ClientId", self.info.client_id())?,
            header("Auth-ClientKey", self.info.client_key())?,
            header("Content-Length", content_length.as_str())?,
        ];
        let path = asset::asset_path(&self.info, name)?;

        let response = self
            .rest
            .put(&path, &headers, body)
            .map_err(|_| Error::Rest)?;

        log!(self, "HTTP {}", response.status_code);
        match response.body_str() {
            Some(text) => self.log_str(text),
            None => self.log_str("<binary response body>"),
        }
        Ok(response.status_code)
    }

    /// Pumps the WiFi driver and the MQTT session, dispatching their events.
    ///
    /// Call as often as possible. Before [`connect`](Self::connect) the WiFi
    /// driver is still pumped but its notifications are discarded.
    ///
    /// # Errors
    ///
    /// [`Error::Wifi`] or [`Error::Mqtt`] if a driver fails while polled.
    /// Failures inside event handling only reach the logging handler.
    pub fn process(&mut self) -> Result<(), Error> {
        while let Some(response) = self.wifi.process().map_err(|_| Error::Wifi)? {
            if self.started {
                self.on_wifi(response);
            }
        }
        if !self.started {
            return Ok(());
        }
        while let Some(event) = self.mqtt.poll().map_err(|_| Error::Mqtt)? {
            self.on_mqtt(event);
        }
        Ok(())
    }

    /// Whether WiFi last reported an acquired address.
    pub fn is_connected(&self) -> bool {
        self.wifi_connected
    }

    /// Echo every received command back as the asset's new state.
    pub fn set_auto_echo(&mut self, echo: bool) {
        self.auto_echo = echo;
    }

    /// Whether received commands are echoed back.
    pub fn auto_echo(&self) -> bool {
        self.auto_echo
    }

    /// Sets the handler invoked for each received command.
    pub fn set_command_handler(&mut self, handler: CommandHandler<'h>) {
        self.on_command = Some(handler);
    }

    /// Sets the handler invoked when WiFi gets an address.
    pub fn set_connect_handler(&mut self, handler: ConnectHandler<'h>) {
        self.on_connect = Some(handler);
    }

    /// Sets the sink for debug log lines.
    pub fn set_logging_handler(&mut self, handler: LoggingHandler<'h>) {
        self.on_log = Some(handler);
    }

    /// Identity of the device.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Endpoints and client parameters.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Borrow the WiFi driver.
    pub fn wifi(&self) -> &W {
        &self.wifi
    }

    /// Mutably borrow the WiFi driver.
    pub fn wifi_mut(&mut self) -> &mut W {
        &mut self.wifi
    }

    /// Borrow the MQTT session.
    pub fn mqtt(&self) -> &M {
        &self.mqtt
    }

    /// Mutably borrow the MQTT session.
    pub fn mqtt_mut(&mut self) -> &mut M {
        &mut self.mqtt
    }

    /// Borrow the REST client.
    pub fn rest(&self) -> &R {
        &self.rest
    }

    /// Mutably borrow the REST client.
    pub fn rest_mut(&mut self) -> &mut R {
        &mut self.rest
    }

    fn on_wifi(&mut self, response: Response) {
        // Only single-argument notifications are status changes.
        let Some(status) = response.station_status() else {
            return;
        };

        if status == StationStatus::GotIp {
            self.log_str("WIFI CONNECTED");
            if let Some(handler) = self.on_connect.as_deref_mut() {
                handler();
            }
            if let Err(err) = self.mqtt.connect(self.config.broker_host, self.config.broker_port) {
                log!(self, "MQTT connect failed: {:?}", err);
            }
            self.wifi_connected = true;
        } else {
            log!(self, "WIFI status {:?}", status);
            self.wifi_connected = false;
            if let Err(err) = self.mqtt.disconnect() {
                log!(self, "MQTT disconnect failed: {:?}", err);
            }
        }
    }

    fn on_mqtt(&mut self, event: Event) {
        match event {
            Event::Connected => self.on_mqtt_connected(),
            Event::Disconnected => self.log_str("MQTT Disconnected"),
            Event::Published(packet_id) => log!(self, "Published #{}", packet_id),
            Event::Data(packet) => self.on_mqtt_data(&packet),
        }
    }

    fn on_mqtt_connected(&mut self) {
        self.log_str("Connected");
        let filter = match topic::command_filter(&self.info) {
            Ok(filter) => filter,
            Err(err) => {
                log!(self, "Command filter: {}", err);
                return;
            }
        };
        if let Err(err) = self.mqtt.subscribe(&filter, self.config.qos) {
            log!(self, "Subscribe failed: {:?}", err);
        }
    }

    fn on_mqtt_data(&mut self, packet: &PublishPacket) {
        log!(self, "Received: topic={}", packet.topic);
        let Ok(value) = core::str::from_utf8(&packet.payload) else {
            self.log_str("Dropped non-UTF-8 payload");
            return;
        };
        log!(self, "data={}", value);

        let Some(name) = topic::asset_from_command_topic(&packet.topic) else {
            log!(self, "Not a command topic: {}", packet.topic);
            return;
        };
        let command = match Command::new(name, value) {
            Ok(command) => command,
            Err(err) => {
                log!(self, "Dropped command for {}: {}", name, err);
                return;
            }
        };

        // confirm receipt to the platform before acting on it
        if self.auto_echo {
            if let Err(err) = self.send(&command.name, &command.value) {
                log!(self, "Echo failed: {}", err);
            }
        }

        if let Some(handler) = self.on_command.as_deref_mut() {
            handler(&command);
        }
    }

    fn log(&mut self, args: fmt::Arguments<'_>) {
        let mut line: String<MAX_LOG_LEN> = String::new();
        let _ = Truncating::new(&mut line).write_fmt(args);
        self.log_str(&line);
    }

    fn log_str(&mut self, line: &str) {
        #[cfg(feature = "defmt")]
        defmt::debug!("{=str}", line);
        if let Some(handler) = self.on_log.as_deref_mut() {
            handler(line);
        }
    }
}

impl<W, M, R> fmt::Debug for Device<'_, W, M, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("info", &self.info)
            .field("config", &self.config)
            .field("started", &self.started)
            .field("wifi_connected", &self.wifi_connected)
            .field("auto_echo", &self.auto_echo)
            .finish_non_exhaustive()
    }
}

/// `fmt::Write` into a fixed line that keeps what fits and drops the rest.
///
/// heapless rejects a whole `write_str` that does not fit; this cuts at the
/// last character that does.
struct Truncating<'a, const N: usize> {
    line: &'a mut String<N>,
    full: bool,
}

impl<'a, const N: usize> Truncating<'a, N> {
    fn new(line: &'a mut String<N>) -> Self {
        Self { line, full: false }
    }
}

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.full {
            return Ok(());
        }
        if self.line.push_str(s).is_ok() {
            return Ok(());
        }
        for c in s.chars() {
            if self.line.push(c).is_err() {
                break;
            }
        }
        self.full = true;
        Ok(())
    }
}

// The bundled session must accept the user name the device builds.
const _: () = assert!(2 * MAX_ID_LEN + 1 <= session::MAX_USERNAME_LEN);
// Received topics and command values are logged whole.
const _: () = assert!("Received: topic=".len() + mqtt::client::MAX_TOPIC_LEN <= MAX_LOG_LEN);
const _: () = assert!("data=".len() + MAX_VALUE_LEN <= MAX_LOG_LEN);
