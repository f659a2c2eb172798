// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Info, Offset};
use crate::{Error, UapiField};
use gpiocdev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// The details of an edge detected on an input line.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeEvent {
    /// The best estimate of time of event occurrence, in nanoseconds.
    ///
    /// The interpretation of this field depends on the line
    /// [`EventClock`](super::EventClock) setting, and so is left raw here.
    pub timestamp_ns: u64,

    /// The event trigger identifier.
    pub kind: EdgeKind,

    /// The offset of the line that triggered the event.
    pub offset: Offset,

    /// The sequence number for this event in the sequence of events for all
    /// the lines in this line request.
    pub seqno: u32,

    /// The sequence number for this event in the sequence of events on this
    /// particular line.
    #[cfg_attr(feature = "serde", serde(rename = "lineSeqno"))]
    pub line_seqno: u32,
}

impl TryFrom<&v2::LineEdgeEvent> for EdgeEvent {
    type Error = Error;

    fn try_from(le: &v2::LineEdgeEvent) -> Result<Self, Self::Error> {
        let kind = v2::LineEdgeEventKind::try_from(le.kind)
            .map_err(|_| Error::UnexpectedResponse(UapiField::Kind, format!("{:?}", le.kind)))?;
        Ok(EdgeEvent {
            timestamp_ns: le.timestamp_ns,
            kind: kind.into(),
            offset: le.offset,
            seqno: le.seqno,
            line_seqno: le.line_seqno,
        })
    }
}

impl fmt::Display for EdgeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<EdgeEvent type={} timestamp_ns={} line_offset={} global_seqno={} line_seqno={}>",
            self.kind, self.timestamp_ns, self.offset, self.seqno, self.line_seqno
        )
    }
}

/// The cause of an [`EdgeEvent`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeKind {
    /// Indicates the line transitioned from inactive to active.
    Rising = 1,

    /// Indicates the line transitioned from active to inactive.
    Falling = 2,
}

impl From<v2::LineEdgeEventKind> for EdgeKind {
    fn from(kind: v2::LineEdgeEventKind) -> Self {
        match kind {
            v2::LineEdgeEventKind::RisingEdge => EdgeKind::Rising,
            v2::LineEdgeEventKind::FallingEdge => EdgeKind::Falling,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::Rising => "rising-edge",
            EdgeKind::Falling => "falling-edge",
        };
        write!(f, "{}", s)
    }
}

/// The details of a change to the [`Info`] for a line.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InfoChangeEvent {
    /// The updated line info.
    pub info: Info,

    /// The best estimate of time of event occurrence.
    ///
    /// The **CLOCK_MONOTONIC** is used as the source for info change timestamps.
    pub timestamp_ns: u64,

    /// The trigger for the change.
    pub kind: InfoChangeKind,
}

impl TryFrom<&v2::LineInfoChangeEvent> for InfoChangeEvent {
    type Error = Error;

    fn try_from(ice: &v2::LineInfoChangeEvent) -> Result<Self, Self::Error> {
        let kind = v2::LineInfoChangeKind::try_from(ice.kind)
            .map_err(|_| Error::UnexpectedResponse(UapiField::Kind, format!("{:?}", ice.kind)))?;
        Ok(InfoChangeEvent {
            info: Info::try_from(&ice.info)?,
            timestamp_ns: ice.timestamp_ns,
            kind: kind.into(),
        })
    }
}

impl fmt::Display for InfoChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<InfoEvent type={} timestamp_ns={} line_info={}>",
            self.kind, self.timestamp_ns, self.info
        )
    }
}

/// The cause of a [`InfoChangeEvent`]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InfoChangeKind {
    /// Line has been requested.
    Requested = 1,

    /// Line has been released.
    Released = 2,

    /// Line has been reconfigured.
    Reconfigured = 3,
}

impl From<v2::LineInfoChangeKind> for InfoChangeKind {
    fn from(kind: v2::LineInfoChangeKind) -> Self {
        match kind {
            v2::LineInfoChangeKind::Requested => InfoChangeKind::Requested,
            v2::LineInfoChangeKind::Released => InfoChangeKind::Released,
            v2::LineInfoChangeKind::Reconfigured => InfoChangeKind::Reconfigured,
        }
    }
}

impl fmt::Display for InfoChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InfoChangeKind::Requested => "requested",
            InfoChangeKind::Released => "released",
            InfoChangeKind::Reconfigured => "reconfigured",
        };
        write!(f, "{}", s)
    }
}
