//! Voltage measurement snapshot.

use core::fmt;

/// Battery charge level, also used as the battery shutdown threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum BatteryLevel {
    #[default]
    Disabled = 0,
    Pct10 = 1,
    Pct25 = 2,
    Pct50 = 3,
    Pct100 = 4,
}

impl BatteryLevel {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::Pct10),
            2 => Some(Self::Pct25),
            3 => Some(Self::Pct50),
            4 => Some(Self::Pct100),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Pct10 => "10%",
            Self::Pct25 => "25%",
            Self::Pct50 => "50%",
            Self::Pct100 => "100%",
        }
    }
}

/// Which rail currently feeds the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputStatus {
    #[default]
    PowerOff = 0,
    Musb = 1,
    Wide = 2,
    Battery = 3,
}

impl OutputStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::PowerOff => "Power-Off",
            Self::Musb => "mUSB",
            Self::Wide => "Wide",
            Self::Battery => "Battery",
        }
    }
}

/// One input rail: scaled voltage plus the connection threshold verdict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rail {
    pub millivolts: u32,
    pub connected: bool,
}

/// Sampled voltages and battery state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Measurements {
    /// Wide-range input
    pub wide: Rail,
    /// LiFePO4 battery
    pub battery: Rail,
    /// microUSB input
    pub usb: Rail,
    /// Output rail, always reported
    pub output_mv: u32,
    pub battery_level: BatteryLevel,
    pub charging: bool,
}

impl Measurements {
    /// Raw millivolt values in wire order: wide, battery, usb, output.
    pub fn millivolts(&self) -> [u32; 4] {
        [
            self.wide.millivolts,
            self.battery.millivolts,
            self.usb.millivolts,
            self.output_mv,
        ]
    }
}

/// Millivolts rendered as `V.mmm V`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Volts(pub u32);

impl fmt::Display for Volts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03} V", self.0 / 1000, self.0 % 1000)
    }
}
