//! Status codes shared by every reporting surface of the firmware.

use crate::config::ConfigError;

/// Firmware-wide result code. Values are stable 32-bit bit flags.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Status {
    Success = 0x0000_0000,
    Internal = 0x0000_0001,
    NotFound = 0x0000_0004,
    NotSupported = 0x0000_0008,
    InvalidParam = 0x0000_0010,
    /// Operation disallowed in the current state.
    InvalidState = 0x0000_0020,
    InvalidLength = 0x0000_0040,
    InvalidData = 0x0000_0100,
    DataSize = 0x0000_0200,
    Timeout = 0x0000_0400,
    Null = 0x0000_0800,
    Forbidden = 0x0000_1000,
    InvalidAddr = 0x0000_2000,
    Busy = 0x0000_4000,
    /// Not enough resources for the operation.
    Resources = 0x0000_8000,
    /// Persisted data (flash or EEPROM) is corrupted.
    InconsistentStorage = 0x0001_0000,
}

const ALL: [Status; 16] = [
    Status::Success,
    Status::Internal,
    Status::NotFound,
    Status::NotSupported,
    Status::InvalidParam,
    Status::InvalidState,
    Status::InvalidLength,
    Status::InvalidData,
    Status::DataSize,
    Status::Timeout,
    Status::Null,
    Status::Forbidden,
    Status::InvalidAddr,
    Status::Busy,
    Status::Resources,
    Status::InconsistentStorage,
];

impl Status {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn from_code(code: u32) -> Option<Self> {
        ALL.iter().copied().find(|status| status.code() == code)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Internal => "internal",
            Self::NotFound => "not_found",
            Self::NotSupported => "not_supported",
            Self::InvalidParam => "invalid_param",
            Self::InvalidState => "invalid_state",
            Self::InvalidLength => "invalid_length",
            Self::InvalidData => "invalid_data",
            Self::DataSize => "data_size",
            Self::Timeout => "timeout",
            Self::Null => "null",
            Self::Forbidden => "forbidden",
            Self::InvalidAddr => "invalid_addr",
            Self::Busy => "busy",
            Self::Resources => "resources",
            Self::InconsistentStorage => "inconsistent_storage",
        }
    }
}

impl From<ConfigError> for Status {
    fn from(_value: ConfigError) -> Self {
        Self::InvalidParam
    }
}
