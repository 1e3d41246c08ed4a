use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(ClientId);
id_newtype!(FlowId);
id_newtype!(ScheduledFlowId);

/// Microseconds since the Unix epoch, the backend's wire unit for timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApiTimestamp(pub i64);

impl ApiTimestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_micros())
    }

    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_micros())
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.0)
    }
}

impl std::ops::Sub<ApiDuration> for ApiTimestamp {
    type Output = ApiTimestamp;

    fn sub(self, window: ApiDuration) -> ApiTimestamp {
        ApiTimestamp(self.0.saturating_sub(window.as_micros()))
    }
}

/// Whole seconds, the backend's wire unit for durations and time windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApiDuration(pub i64);

impl ApiDuration {
    pub const fn from_days(days: i64) -> Self {
        Self(days.saturating_mul(24 * 60 * 60))
    }

    pub const fn as_micros(self) -> i64 {
        self.0.saturating_mul(1_000_000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingSystem {
    Windows,
    Linux,
    Darwin,
}
