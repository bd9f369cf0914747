//! Monitor types and per-channel monitor readings.

use core::fmt;
use core::str::FromStr;

use crate::{Microseconds, Status};

macro_rules! monitor_types {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// The kind of health signal a monitor reports for a channel.
        ///
        /// Monitor types are the leaf keys of the channel tier. They parse
        /// from and display as their upper-case wire names (`"MISSING"`,
        /// `"ENV_CLIPPED"`, ...).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum MonitorType {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $name))]
                $variant,
            )+
        }

        impl MonitorType {
            /// Every known monitor type, in declaration order.
            pub const ALL: &'static [MonitorType] = &[$(MonitorType::$variant),+];

            /// Returns the wire name of this monitor type.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(MonitorType::$variant => $name,)+
                }
            }
        }

        impl FromStr for MonitorType {
            type Err = ParseMonitorTypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(MonitorType::$variant),)+
                    other => Err(ParseMonitorTypeError(other.to_string())),
                }
            }
        }
    };
}

monitor_types! {
    Missing => "MISSING",
    Lag => "LAG",
    Timeliness => "TIMELINESS",
    EnvAuthenticationSealBroken => "ENV_AUTHENTICATION_SEAL_BROKEN",
    EnvBackupPowerUnstable => "ENV_BACKUP_POWER_UNSTABLE",
    EnvCalibrationUnderway => "ENV_CALIBRATION_UNDERWAY",
    EnvClipped => "ENV_CLIPPED",
    EnvClockDifferentialInMicroseconds => "ENV_CLOCK_DIFFERENTIAL_IN_MICROSECONDS",
    EnvClockDifferentialTooLarge => "ENV_CLOCK_DIFFERENTIAL_TOO_LARGE",
    EnvDeadSensorChannel => "ENV_DEAD_SENSOR_CHANNEL",
    EnvDigitizerAnalogInputShorted => "ENV_DIGITIZER_ANALOG_INPUT_SHORTED",
    EnvDigitizerCalibrationLoopBack => "ENV_DIGITIZER_CALIBRATION_LOOP_BACK",
    EnvDigitizingEquipmentOpen => "ENV_DIGITIZING_EQUIPMENT_OPEN",
    EnvDurationOutage => "ENV_DURATION_OUTAGE",
    EnvEquipmentHousingOpen => "ENV_EQUIPMENT_HOUSING_OPEN",
    EnvEquipmentMoved => "ENV_EQUIPMENT_MOVED",
    EnvGap => "ENV_GAP",
    EnvGpsReceiverOff => "ENV_GPS_RECEIVER_OFF",
    EnvGpsReceiverUnlocked => "ENV_GPS_RECEIVER_UNLOCKED",
    EnvLastGpsSyncTime => "ENV_LAST_GPS_SYNC_TIME",
    EnvMainPowerFailure => "ENV_MAIN_POWER_FAILURE",
    EnvMeanAmplitude => "ENV_MEAN_AMPLITUDE",
    EnvStationPowerVoltage => "ENV_STATION_POWER_VOLTAGE",
    EnvVaultDoorOpened => "ENV_VAULT_DOOR_OPENED",
    EnvZeroedData => "ENV_ZEROED_DATA",
}

impl MonitorType {
    /// True for the environmental issue monitors (`ENV_*`).
    pub fn is_environmental(&self) -> bool {
        self.as_str().starts_with("ENV_")
    }
}

impl fmt::Display for MonitorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known monitor type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonitorTypeError(pub String);

impl fmt::Display for ParseMonitorTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown monitor type: {}", self.0)
    }
}

impl std::error::Error for ParseMonitorTypeError {}

/// The measured value behind a monitor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MonitorValue {
    /// A percentage, e.g. the share of missing data or of an environmental issue.
    Percent(f64),
    /// A latency, e.g. LAG or TIMELINESS.
    Duration(Microseconds),
}

/// One monitor's value and status for a channel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorReading {
    pub monitor_type: MonitorType,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub value: Option<MonitorValue>,

    pub status: Status,
}

impl MonitorReading {
    /// A reading that only carries a status.
    pub fn new(monitor_type: MonitorType, status: Status) -> Self {
        Self {
            monitor_type,
            value: None,
            status,
        }
    }

    pub fn builder(monitor_type: MonitorType, status: Status) -> MonitorReadingBuilder {
        MonitorReadingBuilder::new(monitor_type, status)
    }
}

/// Builder for `MonitorReading`.
#[derive(Debug)]
pub struct MonitorReadingBuilder {
    monitor_type: MonitorType,
    value: Option<MonitorValue>,
    status: Status,
}

impl MonitorReadingBuilder {
    pub fn new(monitor_type: MonitorType, status: Status) -> Self {
        Self {
            monitor_type,
            value: None,
            status,
        }
    }

    /// Attach a percentage value.
    pub fn percent(mut self, percent: f64) -> Self {
        self.value = Some(MonitorValue::Percent(percent));
        self
    }

    /// Attach a duration value.
    pub fn duration(mut self, duration: impl Into<Microseconds>) -> Self {
        self.value = Some(MonitorValue::Duration(duration.into()));
        self
    }

    pub fn build(self) -> MonitorReading {
        MonitorReading {
            monitor_type: self.monitor_type,
            value: self.value,
            status: self.status,
        }
    }
}
