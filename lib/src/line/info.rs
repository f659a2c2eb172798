// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Bias, Direction, Drive, EdgeDetection, EventClock, Offset};
use crate::{Error, UapiField};
use gpiocdev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The publicly available information for a line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Info {
    /// The line offset on the GPIO chip.
    pub offset: Offset,

    /// The name of this GPIO line, as specified by the GPIO chip.
    ///
    /// May be empty.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub name: String,

    /// When true the line is used and not available for request.
    pub used: bool,

    /// The label set by the consumer of the line.
    ///
    /// May be empty if not set by the user or the line is unused.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub consumer: String,

    /// The direction of the line.
    pub direction: Direction,

    /// When true the line active state corresponds to a physical low.
    pub active_low: bool,

    /// The bias state of the line.
    ///
    /// [`Bias::Unknown`] if the kernel does not report a bias.
    pub bias: Bias,

    /// The drive applied to output lines.
    pub drive: Drive,

    /// The edge detection state for the line.
    pub edge_detection: EdgeDetection,

    /// The source clock for edge event timestamps.
    pub event_clock: EventClock,

    /// When true the line is debounced.
    pub debounced: bool,

    /// The debounce period.
    ///
    /// Zero if the line is not debounced.
    pub debounce_period: Duration,
}

impl TryFrom<&v2::LineInfo> for Info {
    type Error = Error;

    fn try_from(li: &v2::LineInfo) -> Result<Self, Self::Error> {
        if li.num_attrs > v2::NUM_ATTRS_MAX as u32 {
            return Err(Error::UnexpectedResponse(
                UapiField::NumAttrs,
                format!("{}", li.num_attrs),
            ));
        }
        let mut debounce_period = Duration::ZERO;
        for idx in 0..li.num_attrs as usize {
            if let Some(v2::LineAttributeValue::DebouncePeriod(db)) = li.attr(idx).to_value() {
                debounce_period = db;
            }
        }
        Ok(Info {
            offset: li.offset,
            name: String::from(&li.name),
            used: li.flags.contains(v2::LineFlags::USED),
            consumer: String::from(&li.consumer),
            direction: Direction::from(li.flags),
            active_low: li.flags.contains(v2::LineFlags::ACTIVE_LOW),
            bias: Bias::from(li.flags),
            drive: Drive::from(li.flags),
            edge_detection: EdgeDetection::from(li.flags),
            event_clock: EventClock::from(li.flags),
            debounced: !debounce_period.is_zero(),
            debounce_period,
        })
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<LineInfo offset={} name=\"{}\" used={} consumer=\"{}\" direction={} active_low={} bias={} drive={} edge_detection={} event_clock={} debounced={} debounce_period={:?}>",
            self.offset,
            self.name,
            self.used,
            self.consumer,
            self.direction,
            self.active_low,
            self.bias,
            self.drive,
            self.edge_detection,
            self.event_clock,
            self.debounced,
            self.debounce_period,
        )
    }
}
