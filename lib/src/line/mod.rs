// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod event;
pub use self::event::{EdgeEvent, EdgeKind, InfoChangeEvent, InfoChangeKind};

mod id;
pub use self::id::{resolve, LineId, LineLookup};
#[cfg(test)]
pub(crate) use self::id::tests::FakeChip;

mod info;
pub use self::info::Info;

mod settings;
pub use self::settings::Settings;

use gpiocdev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// An identifier for a line on a particular chip.
///
/// Valid offsets are in the range 0..`num_lines` as reported in the chip [`Info`](super::chip::Info).
pub type Offset = u32;

/// The direction of a line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Leave the direction as currently set.
    #[default]
    AsIs,

    /// The line is an input.
    Input,

    /// The line is an output.
    Output,
}

impl From<v2::LineFlags> for Direction {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::OUTPUT) {
            return Direction::Output;
        }
        if flags.contains(v2::LineFlags::INPUT) {
            return Direction::Input;
        }
        Direction::AsIs
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::AsIs => "as-is",
            Direction::Input => "input",
            Direction::Output => "output",
        };
        write!(f, "{}", s)
    }
}

/// The bias settings for a line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Bias {
    /// Leave the bias as currently set.
    #[default]
    AsIs,

    /// The bias state cannot be determined.
    ///
    /// Only reported in line info, never applied.
    Unknown,

    /// The line has bias disabled and will float unless externally driven.
    Disabled,

    /// The line has pull-up enabled.
    PullUp,

    /// The line has pull-down enabled.
    PullDown,
}

impl From<v2::LineFlags> for Bias {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::BIAS_PULL_UP) {
            return Bias::PullUp;
        }
        if flags.contains(v2::LineFlags::BIAS_PULL_DOWN) {
            return Bias::PullDown;
        }
        if flags.contains(v2::LineFlags::BIAS_DISABLED) {
            return Bias::Disabled;
        }
        Bias::Unknown
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Bias::AsIs => "as-is",
            Bias::Unknown => "unknown",
            Bias::Disabled => "disabled",
            Bias::PullUp => "pull-up",
            Bias::PullDown => "pull-down",
        };
        write!(f, "{}", s)
    }
}

/// The drive policy settings for an output line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Drive {
    /// The line is driven when both active and inactive.
    ///
    /// This is the default if drive is not specified.
    #[default]
    PushPull,

    /// The line is driven when low and set high impedance when high.
    OpenDrain,

    /// The line is driven when high and set high impedance when low.
    OpenSource,
}

impl From<v2::LineFlags> for Drive {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::OPEN_DRAIN) {
            return Drive::OpenDrain;
        }
        if flags.contains(v2::LineFlags::OPEN_SOURCE) {
            return Drive::OpenSource;
        }
        Drive::PushPull
    }
}

impl fmt::Display for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Drive::PushPull => "push-pull",
            Drive::OpenDrain => "open-drain",
            Drive::OpenSource => "open-source",
        };
        write!(f, "{}", s)
    }
}

/// The edge detection options for an input line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeDetection {
    /// Edge detection is disabled.
    #[default]
    None,

    /// Edge detection is only enabled on rising edges.
    ///
    /// A rising edge means a transition from an inactive state to an active state.
    Rising,

    /// Edge detection is only enabled on falling edges.
    ///
    /// A falling edge means a transition from an active state to an inactive state.
    Falling,

    /// Edge detection is enabled on both rising and falling edges.
    Both,
}

impl From<v2::LineFlags> for EdgeDetection {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::EDGE_RISING | v2::LineFlags::EDGE_FALLING) {
            return EdgeDetection::Both;
        }
        if flags.contains(v2::LineFlags::EDGE_RISING) {
            return EdgeDetection::Rising;
        }
        if flags.contains(v2::LineFlags::EDGE_FALLING) {
            return EdgeDetection::Falling;
        }
        EdgeDetection::None
    }
}

impl fmt::Display for EdgeDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeDetection::None => "none",
            EdgeDetection::Rising => "rising",
            EdgeDetection::Falling => "falling",
            EdgeDetection::Both => "both",
        };
        write!(f, "{}", s)
    }
}

/// The available clock sources for [`EdgeEvent`] timestamps.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventClock {
    /// The **CLOCK_MONOTONIC** is used as the source for edge event timestamps.
    #[default]
    Monotonic,

    /// The **CLOCK_REALTIME** is used as the source for edge event timestamps.
    Realtime,

    /// The hardware timestamp engine provides event timestamps.
    ///
    /// This source requires a Linux kernel 5.19 or later with CONFIG_HTE
    /// enabled and suitable supporting hardware.
    Hte,
}

impl From<v2::LineFlags> for EventClock {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::EVENT_CLOCK_REALTIME) {
            return EventClock::Realtime;
        }
        if flags.contains(v2::LineFlags::EVENT_CLOCK_HTE) {
            return EventClock::Hte;
        }
        EventClock::Monotonic
    }
}

impl fmt::Display for EventClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventClock::Monotonic => "monotonic",
            EventClock::Realtime => "realtime",
            EventClock::Hte => "hte",
        };
        write!(f, "{}", s)
    }
}

/// The logical level of a line.
///
/// The mapping between logical and physical levels depends on the
///  active-low setting as follows:
///
/// |             | Physical Low | Physical High |
/// |-------------|--------------|---------------|
/// | **Active-High** | Inactive | Active |
/// | **Active-Low**  | Active | Inactive |
///
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// The line is inactive.
    #[default]
    Inactive,

    /// The line is active.
    Active,
}

impl Value {
    /// The value opposite the current value.
    pub fn not(&self) -> Value {
        match self {
            Value::Active => Value::Inactive,
            Value::Inactive => Value::Active,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Value::Active => "active",
            Value::Inactive => "inactive",
        };
        write!(f, "{}", s)
    }
}

impl From<Value> for bool {
    fn from(v: Value) -> bool {
        v == Value::Active
    }
}

impl From<Value> for u8 {
    fn from(v: Value) -> u8 {
        match v {
            Value::Inactive => 0,
            Value::Active => 1,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        if b {
            Value::Active
        } else {
            Value::Inactive
        }
    }
}

impl From<u8> for Value {
    fn from(i: u8) -> Value {
        match i {
            0 => Value::Inactive,
            _ => Value::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_v2_line_flags() {
        assert_eq!(Direction::from(v2::LineFlags::OUTPUT), Direction::Output);
        assert_eq!(Direction::from(v2::LineFlags::INPUT), Direction::Input);
        assert_eq!(Direction::from(v2::LineFlags::ACTIVE_LOW), Direction::AsIs);
        assert_eq!(Direction::default(), Direction::AsIs);
    }

    #[test]
    fn bias_from_v2_line_flags() {
        assert_eq!(Bias::from(v2::LineFlags::INPUT), Bias::Unknown);
        assert_eq!(Bias::from(v2::LineFlags::BIAS_PULL_DOWN), Bias::PullDown);
        assert_eq!(Bias::from(v2::LineFlags::BIAS_PULL_UP), Bias::PullUp);
        assert_eq!(Bias::from(v2::LineFlags::BIAS_DISABLED), Bias::Disabled);
        assert_eq!(Bias::default(), Bias::AsIs);
    }

    #[test]
    fn drive_from_v2_line_flags() {
        assert_eq!(Drive::from(v2::LineFlags::OUTPUT), Drive::PushPull);
        assert_eq!(
            Drive::from(v2::LineFlags::OUTPUT | v2::LineFlags::OPEN_DRAIN),
            Drive::OpenDrain
        );
        assert_eq!(
            Drive::from(v2::LineFlags::OUTPUT | v2::LineFlags::OPEN_SOURCE),
            Drive::OpenSource
        );
    }

    #[test]
    fn edge_detection_from_v2_line_flags() {
        assert_eq!(
            EdgeDetection::from(v2::LineFlags::INPUT),
            EdgeDetection::None
        );
        assert_eq!(
            EdgeDetection::from(v2::LineFlags::EDGE_RISING),
            EdgeDetection::Rising
        );
        assert_eq!(
            EdgeDetection::from(v2::LineFlags::EDGE_FALLING),
            EdgeDetection::Falling
        );
        assert_eq!(
            EdgeDetection::from(v2::LineFlags::EDGE_RISING | v2::LineFlags::EDGE_FALLING),
            EdgeDetection::Both
        );
    }

    #[test]
    fn event_clock_from_v2_line_flags() {
        assert_eq!(
            EventClock::from(v2::LineFlags::INPUT),
            EventClock::Monotonic
        );
        assert_eq!(
            EventClock::from(v2::LineFlags::EVENT_CLOCK_REALTIME),
            EventClock::Realtime
        );
        assert_eq!(
            EventClock::from(v2::LineFlags::EVENT_CLOCK_HTE),
            EventClock::Hte
        );
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::Active.not(), Value::Inactive);
        assert_eq!(Value::Inactive.not(), Value::Active);
        assert!(bool::from(Value::Active));
        assert_eq!(u8::from(Value::Inactive), 0);
        assert_eq!(Value::from(true), Value::Active);
        assert_eq!(Value::from(7_u8), Value::Active);
        assert_eq!(Value::from(0_u8), Value::Inactive);
        assert_eq!(Value::default(), Value::Inactive);
        assert_eq!(Value::Active.to_string(), "active");
    }

    #[test]
    fn display() {
        assert_eq!(Direction::Output.to_string(), "output");
        assert_eq!(Bias::PullDown.to_string(), "pull-down");
        assert_eq!(Drive::OpenDrain.to_string(), "open-drain");
        assert_eq!(EdgeDetection::Both.to_string(), "both");
        assert_eq!(EventClock::Realtime.to_string(), "realtime");
    }
}
