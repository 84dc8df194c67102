//! Timeout mapping from request details to per-phase transport timeouts

use std::time::Duration;

/// Read, connect and write timeouts derived from one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimeouts {
    pub read: Option<Duration>,
    pub connect: Option<Duration>,
    pub write: Option<Duration>,
}

impl PhaseTimeouts {
    /// Derive phase timeouts from a unified `timeout` and an `open_timeout`.
    ///
    /// `timeout` applies to all three phases and `open_timeout` then
    /// overrides the connect phase. Without `timeout` nothing is set, even
    /// when `open_timeout` is given.
    pub fn from_request(timeout: Option<Duration>, open_timeout: Option<Duration>) -> Self {
        let Some(timeout) = timeout else {
            return Self::default();
        };

        Self {
            read: Some(timeout),
            connect: Some(open_timeout.unwrap_or(timeout)),
            write: Some(timeout),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read.is_none() && self.connect.is_none() && self.write.is_none()
    }
}

/// Serde support for `Option<Duration>` written as fractional seconds
pub(crate) mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<f64>::deserialize(deserializer)?;
        secs.map(|s| Duration::try_from_secs_f64(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
