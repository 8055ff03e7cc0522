use std::fmt;

/// Machine-readable error codes for the fallible plumbing under the store.
///
/// Core list operations never fail; these codes classify what went wrong in
/// configuration, storage backends, and the persisted-state codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidStorageKey,
    CorruptState,
    StorageReadFailed,
    StorageWriteFailed,
    LockContention,
    StorageUnavailable,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::InvalidStorageKey => "E2006",
            Self::CorruptState => "E3003",
            Self::StorageReadFailed => "E5003",
            Self::StorageWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::StorageUnavailable => "E5004",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidStorageKey => "Invalid storage key",
            Self::CorruptState => "Corrupt persisted list",
            Self::StorageReadFailed => "Storage read failed",
            Self::StorageWriteFailed => "Storage write failed",
            Self::LockContention => "Lock contention",
            Self::StorageUnavailable => "Storage unavailable",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .ticklist/config.toml and retry."),
            Self::InvalidStorageKey => {
                Some("Keys use ASCII letters, digits, '-', '_' and a non-leading '.'.")
            }
            Self::CorruptState => {
                Some("The stored list was ignored; the next change overwrites it.")
            }
            Self::StorageReadFailed | Self::StorageWriteFailed => {
                Some("Check disk space and permissions on the data directory.")
            }
            Self::LockContention => Some("Retry after the other process releases its lock."),
            Self::StorageUnavailable => None,
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
