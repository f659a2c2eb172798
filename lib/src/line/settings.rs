// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Bias, Direction, Drive, EdgeDetection, EventClock, Value};
use gpiocdev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The configurable settings for a line.
///
/// A plain value type.  The default leaves the line as configured by the
/// kernel, other than disabling edge detection and debounce.
///
/// The builder methods consume and return the settings, so they can be chained:
/// ```
/// # use gpiolines::line::{Bias, EdgeDetection, Settings};
/// # use std::time::Duration;
/// let s = Settings::default()
///     .as_input()
///     .with_bias(Bias::PullUp)
///     .with_edge_detection(EdgeDetection::Both)
///     .with_debounce_period(Duration::from_millis(5));
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    /// The direction setting for the line.
    pub direction: Direction,

    /// The edge detection setting for the line.
    pub edge_detection: EdgeDetection,

    /// The bias setting for the line.
    pub bias: Bias,

    /// The drive setting for the line.
    ///
    /// Only relevant for output lines.
    pub drive: Drive,

    /// The active-low setting for the line.
    pub active_low: bool,

    /// The debounce period for the line.
    ///
    /// Zero disables debounce.
    pub debounce_period: Duration,

    /// The source clock for edge event timestamps.
    pub event_clock: EventClock,

    /// The value to drive the line to when set as an output.
    pub output_value: Value,
}

impl Settings {
    /// Set the line as an input.
    pub fn as_input(mut self) -> Self {
        self.direction = Direction::Input;
        self
    }

    /// Set the line as an output driven to `value`.
    pub fn as_output(mut self, value: Value) -> Self {
        self.direction = Direction::Output;
        self.output_value = value;
        self
    }

    /// Set the line as active low.
    pub fn as_active_low(mut self) -> Self {
        self.active_low = true;
        self
    }

    /// Set the line as active high.
    pub fn as_active_high(mut self) -> Self {
        self.active_low = false;
        self
    }

    /// Set the bias of the line.
    pub fn with_bias(mut self, bias: Bias) -> Self {
        self.bias = bias;
        self
    }

    /// Set the drive of the line.
    pub fn with_drive(mut self, drive: Drive) -> Self {
        self.drive = drive;
        self
    }

    /// Set the edges to detect on the line.
    pub fn with_edge_detection(mut self, edge: EdgeDetection) -> Self {
        self.edge_detection = edge;
        self
    }

    /// Set the debounce period of the line.
    pub fn with_debounce_period(mut self, period: Duration) -> Self {
        self.debounce_period = period;
        self
    }

    /// Set the clock source for edge event timestamps.
    pub fn with_event_clock(mut self, clock: EventClock) -> Self {
        self.event_clock = clock;
        self
    }

    /// Set the value the line is driven to if it is an output.
    pub fn with_output_value(mut self, value: Value) -> Self {
        self.output_value = value;
        self
    }

    // Debounce in whole microseconds, rounded up, as the kernel expects.
    pub(crate) fn debounce_us(&self) -> u32 {
        let us = (self.debounce_period.as_nanos() + 999) / 1000;
        u32::try_from(us).unwrap_or(u32::MAX)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<LineSettings direction={} edge_detection={} bias={} drive={} active_low={} debounce_period={:?} event_clock={} output_value={}>",
            self.direction,
            self.edge_detection,
            self.bias,
            self.drive,
            self.active_low,
            self.debounce_period,
            self.event_clock,
            self.output_value,
        )
    }
}

impl From<&Settings> for v2::LineFlags {
    fn from(s: &Settings) -> v2::LineFlags {
        let mut flags = v2::LineFlags::default();
        if s.active_low {
            flags.set(v2::LineFlags::ACTIVE_LOW, true);
        }
        match s.bias {
            Bias::AsIs | Bias::Unknown => {}
            Bias::PullUp => flags.set(v2::LineFlags::BIAS_PULL_UP, true),
            Bias::PullDown => flags.set(v2::LineFlags::BIAS_PULL_DOWN, true),
            Bias::Disabled => flags.set(v2::LineFlags::BIAS_DISABLED, true),
        };
        if s.direction == Direction::Output {
            flags.set(v2::LineFlags::OUTPUT, true);
            match s.drive {
                Drive::PushPull => {}
                Drive::OpenDrain => flags.set(v2::LineFlags::OPEN_DRAIN, true),
                Drive::OpenSource => flags.set(v2::LineFlags::OPEN_SOURCE, true),
            };
        }
        // Edge detection implies input.
        // Combined with output the kernel rejects the request.
        if s.direction == Direction::Input || s.edge_detection != EdgeDetection::None {
            flags.set(v2::LineFlags::INPUT, true);
        }
        match s.edge_detection {
            EdgeDetection::None => {}
            EdgeDetection::Rising => flags.set(v2::LineFlags::EDGE_RISING, true),
            EdgeDetection::Falling => flags.set(v2::LineFlags::EDGE_FALLING, true),
            EdgeDetection::Both => flags.set(
                v2::LineFlags::EDGE_RISING | v2::LineFlags::EDGE_FALLING,
                true,
            ),
        };
        if s.edge_detection != EdgeDetection::None {
            match s.event_clock {
                EventClock::Monotonic => {}
                EventClock::Realtime => flags.set(v2::LineFlags::EVENT_CLOCK_REALTIME, true),
                EventClock::Hte => flags.set(v2::LineFlags::EVENT_CLOCK_HTE, true),
            };
        }
        flags
    }
}
