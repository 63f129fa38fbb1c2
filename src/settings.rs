//! Typed launcher settings resolved from a [`ConfigStore`].
//!
//! Blank values (empty or whitespace only) count as absent. Required region
//! keys produce [`SettingsError::Missing`]; optional ports fall back to the
//! launcher defaults.

use crate::config_store::ConfigStore;
use crate::error::SettingsError;
use crate::keys::{region_key, RegionKey, COMMON_JAVA_HOME, COMMON_JAVA_OPTIONS, COMMON_TOMCAT_LOCATION};
use core::hash::BuildHasher;

pub const DEFAULT_SHUTDOWN_PORT: u16 = 8005;
pub const DEFAULT_HTTP_PORT: u16 = 8080;

fn non_blank<S>(store: &ConfigStore<S>, key: &str) -> Option<String>
where
    S: BuildHasher + Clone + Default,
{
    store
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Settings shared by every region.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommonSettings {
    pub java_home: Option<String>,
    pub java_options: Option<String>,
    pub tomcat_location: Option<String>,
}

impl CommonSettings {
    pub fn from_store<S>(store: &ConfigStore<S>) -> Self
    where
        S: BuildHasher + Clone + Default,
    {
        Self {
            java_home: non_blank(store, COMMON_JAVA_HOME),
            java_options: non_blank(store, COMMON_JAVA_OPTIONS),
            tomcat_location: non_blank(store, COMMON_TOMCAT_LOCATION),
        }
    }
}

/// Settings for one named region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSettings {
    pub region: String,
    pub war_location: String,
    pub bshome_location: String,
    pub shutdown_port: u16,
    pub http_port: u16,
    pub https_port: Option<u16>,
    pub jmx_port: Option<u16>,
    pub ajp_port: Option<u16>,
}

impl RegionSettings {
    pub fn from_store<S>(store: &ConfigStore<S>, region: &str) -> Result<Self, SettingsError>
    where
        S: BuildHasher + Clone + Default,
    {
        if region.trim().is_empty() {
            return Err(SettingsError::EmptyRegion);
        }
        let required = |which| {
            let key = region_key(region, which);
            non_blank(store, &key).ok_or(SettingsError::Missing { key })
        };
        let port = |which| -> Result<Option<u16>, SettingsError> {
            let key = region_key(region, which);
            match non_blank(store, &key) {
                None => Ok(None),
                Some(value) => match value.parse::<u16>() {
                    Ok(p) if p != 0 => Ok(Some(p)),
                    _ => Err(SettingsError::InvalidPort { key, value }),
                },
            }
        };

        Ok(Self {
            region: region.to_owned(),
            war_location: required(RegionKey::WarLocation)?,
            bshome_location: required(RegionKey::BsHomeLocation)?,
            shutdown_port: port(RegionKey::ShutdownPort)?.unwrap_or(DEFAULT_SHUTDOWN_PORT),
            http_port: port(RegionKey::HttpPort)?.unwrap_or(DEFAULT_HTTP_PORT),
            https_port: port(RegionKey::HttpsPort)?,
            jmx_port: port(RegionKey::JmxPort)?,
            ajp_port: port(RegionKey::AjpPort)?,
        })
    }
}
