//! Asset registration document.

use super::{DeviceInfo, Error};
use core::fmt::Write;
use heapless::String;
use serde::Serialize;

/// Size of the buffer the asset document is serialized into.
pub const MAX_BODY_LEN: usize = 128;
/// Maximum request path length.
pub const MAX_PATH_LEN: usize = 128;

/// Whether an asset reports values or accepts commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Reports measurements.
    Sensor,
    /// Accepts commands.
    Actuator,
}

impl AssetType {
    /// Platform name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Sensor => "sensor",
            AssetType::Actuator => "actuator",
        }
    }
}

/// Value schema of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Profile<'a> {
    /// JSON Schema type, e.g. `"number"`, `"integer"`, `"boolean"`.
    #[serde(rename = "type")]
    pub kind: &'a str,
}

/// Body of `PUT /device/{id}/asset/{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetDefinition<'a> {
    /// Display title; the device uses the asset name.
    pub title: &'a str,
    /// Asset type.
    pub is: AssetType,
    /// Value schema.
    pub profile: Profile<'a>,
}

impl<'a> AssetDefinition<'a> {
    /// Definition titled after the asset name.
    pub fn new(name: &'a str, kind: AssetType, profile_type: &'a str) -> Self {
        Self {
            title: name,
            is: kind,
            profile: Profile { kind: profile_type },
        }
    }

    /// Serializes the definition into `buf` and returns the used length.
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, Error> {
        serde_json_core::to_slice(self, buf).map_err(|_| Error::Serialize)
    }
}

/// REST path of asset `name`.
pub fn asset_path(info: &DeviceInfo, name: &str) -> Result<String<MAX_PATH_LEN>, Error> {
    let mut path = String::new();
    write!(path, "/device/{}/asset/{}", info.device_id(), name).map_err(|_| Error::BufferOverflow)?;
    Ok(path)
}
