//! Topic and payload conventions of the platform.
//!
//! Outbound state goes to
//! `client.{clientId}.out.device.{deviceId}.asset.{name}.state` with a
//! `{timestamp}|{value}` payload, where a zero timestamp asks the platform
//! to stamp the value with server time. Commands arrive on
//! `client.{clientId}.in.device.{deviceId}.asset.{name}.command`; the broker
//! may deliver them with `/` instead of `.` between segments.

use super::{DeviceInfo, Error, MAX_VALUE_LEN};
use core::fmt::Write;
use heapless::String;

/// Maximum topic length.
pub const MAX_TOPIC_LEN: usize = 256;
/// Maximum state payload length: a 64-bit timestamp, `|` and the value.
pub const MAX_PAYLOAD_LEN: usize = MAX_VALUE_LEN + 21;

const SEPARATORS: [char; 2] = ['.', '/'];

/// Topic on which the state of asset `name` is published.
pub fn state_topic(info: &DeviceInfo, name: &str) -> Result<String<MAX_TOPIC_LEN>, Error> {
    let mut topic = String::new();
    write!(
        topic,
        "client.{}.out.device.{}.asset.{}.state",
        info.client_id(),
        info.device_id(),
        name
    )
    .map_err(|_| Error::BufferOverflow)?;
    Ok(topic)
}

/// Wildcard filter covering the commands of every asset of the device.
pub fn command_filter(info: &DeviceInfo) -> Result<String<MAX_TOPIC_LEN>, Error> {
    let mut topic = String::new();
    write!(
        topic,
        "client.{}.in.device.{}.asset.*.command",
        info.client_id(),
        info.device_id()
    )
    .map_err(|_| Error::BufferOverflow)?;
    Ok(topic)
}

/// State payload `{timestamp}|{value}`.
pub fn state_payload(timestamp: u64, value: &str) -> Result<String<MAX_PAYLOAD_LEN>, Error> {
    let mut payload = String::new();
    write!(payload, "{}|{}", timestamp, value).map_err(|_| Error::BufferOverflow)?;
    Ok(payload)
}

/// Extracts the asset name from an inbound command topic.
///
/// The name is the text between the last `asset` segment and the trailing
/// `command` segment. Searching from the end keeps client or device ids
/// named `asset` from being mistaken for the marker; an asset name that
/// itself contains an `asset` segment is cut to the part after it.
/// Returns `None` for topics of any other shape.
pub fn asset_from_command_topic(topic: &str) -> Option<&str> {
    let head = SEPARATORS
        .iter()
        .find_map(|sep| topic.strip_suffix("command")?.strip_suffix(*sep))?;

    let start = SEPARATORS
        .iter()
        .filter_map(|sep| {
            let mut marker: String<8> = String::new();
            write!(marker, "asset{}", sep).ok()?;
            head.rfind(marker.as_str()).map(|i| i + marker.len())
        })
        .max()?;

    // "asset" must start a segment, not end some longer word
    let marker_pos = start - "asset.".len();
    if marker_pos > 0 && !head[..marker_pos].ends_with(SEPARATORS) {
        return None;
    }

    match &head[start..] {
        "" => None,
        name => Some(name),
    }
}
