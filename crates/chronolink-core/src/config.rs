//! Build-time station and time-sync configuration.

use core::fmt;

use heapless::String;

use crate::time::SyncPolicy;

pub const SSID_MAX_BYTES: usize = 32;
pub const PASSWORD_MAX_BYTES: usize = 64;
pub const SAE_ID_MAX_BYTES: usize = 32;
pub const SERVER_MAX_BYTES: usize = 64;

pub const DEFAULT_MAX_RETRIES: u8 = 5;
pub const DEFAULT_JOIN_WAIT_MS: u64 = 50_000;
pub const DEFAULT_TIME_SERVER: &str = "pool.ntp.org";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    SsidEmpty,
    SsidTooLong,
    PasswordTooLong,
    SaeIdentifierTooLong,
    ServerEmpty,
    ServerTooLong,
    UnknownAuthFloor,
    UnknownSaeMode,
    InvalidRetryCount,
    InvalidJoinWait,
}

/// Weakest authentication mode the station accepts from an access point.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthFloor {
    Open,
    Wep,
    WpaPsk,
    Wpa2Psk,
    WpaWpa2Psk,
    Wpa3Psk,
    Wpa2Wpa3Psk,
    WapiPsk,
}

impl AuthFloor {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim() {
            "open" => Ok(Self::Open),
            "wep" => Ok(Self::Wep),
            "wpa-psk" => Ok(Self::WpaPsk),
            "wpa2-psk" => Ok(Self::Wpa2Psk),
            "wpa-wpa2-psk" => Ok(Self::WpaWpa2Psk),
            "wpa3-psk" => Ok(Self::Wpa3Psk),
            "wpa2-wpa3-psk" => Ok(Self::Wpa2Wpa3Psk),
            "wapi-psk" => Ok(Self::WapiPsk),
            _ => Err(ConfigError::UnknownAuthFloor),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Wep => "wep",
            Self::WpaPsk => "wpa-psk",
            Self::Wpa2Psk => "wpa2-psk",
            Self::WpaWpa2Psk => "wpa-wpa2-psk",
            Self::Wpa3Psk => "wpa3-psk",
            Self::Wpa2Wpa3Psk => "wpa2-wpa3-psk",
            Self::WapiPsk => "wapi-psk",
        }
    }
}

/// WPA3 SAE password-element derivation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SaeMode {
    HuntAndPeck,
    HashToElement,
    Both,
}

impl SaeMode {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim() {
            "hunt-and-peck" => Ok(Self::HuntAndPeck),
            "hash-to-element" => Ok(Self::HashToElement),
            "both" => Ok(Self::Both),
            _ => Err(ConfigError::UnknownSaeMode),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HuntAndPeck => "hunt-and-peck",
            Self::HashToElement => "hash-to-element",
            Self::Both => "both",
        }
    }

    /// Hash-to-element derivation is the only one keyed by a password identifier.
    pub const fn uses_identifier(self) -> bool {
        !matches!(self, Self::HuntAndPeck)
    }
}

pub fn parse_retry_count(raw: &str) -> Result<u8, ConfigError> {
    raw.trim()
        .parse::<u8>()
        .map_err(|_| ConfigError::InvalidRetryCount)
}

/// Join wait in milliseconds; zero would time out before the station starts.
pub fn parse_join_wait_ms(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidJoinWait),
        Ok(wait_ms) => Ok(wait_ms),
    }
}

fn bounded<const N: usize>(raw: &str, too_long: ConfigError) -> Result<String<N>, ConfigError> {
    let mut out = String::new();
    out.push_str(raw).map_err(|_| too_long)?;
    Ok(out)
}

/// Everything one join cycle needs to associate with the configured network.
#[derive(Clone, Eq, PartialEq)]
pub struct JoinConfig {
    ssid: String<SSID_MAX_BYTES>,
    password: String<PASSWORD_MAX_BYTES>,
    auth_floor: AuthFloor,
    sae_mode: SaeMode,
    sae_identifier: String<SAE_ID_MAX_BYTES>,
    max_retries: u8,
    wait_timeout_ms: u64,
}

impl JoinConfig {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConfigError> {
        if ssid.is_empty() {
            return Err(ConfigError::SsidEmpty);
        }

        Ok(Self {
            ssid: bounded(ssid, ConfigError::SsidTooLong)?,
            password: bounded(password, ConfigError::PasswordTooLong)?,
            auth_floor: AuthFloor::Wpa2Psk,
            sae_mode: SaeMode::Both,
            sae_identifier: String::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            wait_timeout_ms: DEFAULT_JOIN_WAIT_MS,
        })
    }

    pub fn with_auth_floor(mut self, auth_floor: AuthFloor) -> Self {
        self.auth_floor = auth_floor;
        self
    }

    pub fn with_sae(mut self, mode: SaeMode, identifier: &str) -> Result<Self, ConfigError> {
        self.sae_mode = mode;
        self.sae_identifier = bounded(identifier, ConfigError::SaeIdentifierTooLong)?;
        Ok(self)
    }

    pub fn with_max_retries(mut self, max_retries: u8) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_wait_timeout_ms(mut self, wait_timeout_ms: u64) -> Self {
        self.wait_timeout_ms = wait_timeout_ms;
        self
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub const fn auth_floor(&self) -> AuthFloor {
        self.auth_floor
    }

    pub const fn sae_mode(&self) -> SaeMode {
        self.sae_mode
    }

    /// Password identifier for hash-to-element; empty for hunt-and-peck.
    pub fn sae_identifier(&self) -> &str {
        if self.sae_mode.uses_identifier() {
            &self.sae_identifier
        } else {
            ""
        }
    }

    pub const fn max_retries(&self) -> u8 {
        self.max_retries
    }

    pub const fn wait_timeout_ms(&self) -> u64 {
        self.wait_timeout_ms
    }
}

impl fmt::Debug for JoinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinConfig")
            .field("ssid", &self.ssid.as_str())
            .field("password", &"<redacted>")
            .field("auth_floor", &self.auth_floor)
            .field("sae_mode", &self.sae_mode)
            .field("max_retries", &self.max_retries)
            .field("wait_timeout_ms", &self.wait_timeout_ms)
            .finish()
    }
}

/// Time server and polling policy for the post-join sync.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimeSyncConfig {
    server: String<SERVER_MAX_BYTES>,
    policy: SyncPolicy,
}

impl TimeSyncConfig {
    pub fn new(server: &str) -> Result<Self, ConfigError> {
        let server = server.trim();
        if server.is_empty() {
            return Err(ConfigError::ServerEmpty);
        }

        Ok(Self {
            server: bounded(server, ConfigError::ServerTooLong)?,
            policy: SyncPolicy::new(),
        })
    }

    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub const fn policy(&self) -> SyncPolicy {
        self.policy
    }
}

/// Raw option strings as captured from the build environment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BuildOptions<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    pub auth_floor: Option<&'a str>,
    pub sae_mode: Option<&'a str>,
    pub sae_identifier: Option<&'a str>,
    pub max_retries: Option<&'a str>,
    pub join_wait_ms: Option<&'a str>,
    pub time_server: Option<&'a str>,
}

impl<'a> BuildOptions<'a> {
    pub const fn new(ssid: &'a str, password: &'a str) -> Self {
        Self {
            ssid,
            password,
            auth_floor: None,
            sae_mode: None,
            sae_identifier: None,
            max_retries: None,
            join_wait_ms: None,
            time_server: None,
        }
    }

    /// Validate every option; unset options take their defaults.
    pub fn resolve(&self) -> Result<(JoinConfig, TimeSyncConfig), ConfigError> {
        let mut join = JoinConfig::new(self.ssid, self.password)?;

        if let Some(raw) = self.auth_floor {
            join = join.with_auth_floor(AuthFloor::parse(raw)?);
        }

        let sae_mode = match self.sae_mode {
            Some(raw) => SaeMode::parse(raw)?,
            None => SaeMode::Both,
        };
        join = join.with_sae(sae_mode, self.sae_identifier.unwrap_or(""))?;

        if let Some(raw) = self.max_retries {
            join = join.with_max_retries(parse_retry_count(raw)?);
        }

        if let Some(raw) = self.join_wait_ms {
            join = join.with_wait_timeout_ms(parse_join_wait_ms(raw)?);
        }

        let time = TimeSyncConfig::new(self.time_server.unwrap_or(DEFAULT_TIME_SERVER))?;
        Ok((join, time))
    }
}

#[cfg(test)]
mod tests;
