// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::Offset;
use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Identifies a line either by its offset on the chip or by its name.
///
/// Names are resolved against the chip when a request is made, so a
/// [`Config`](crate::request::Config) may freely mix the two forms.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineId {
    /// The offset of the line on the chip.
    Offset(Offset),

    /// The name of the line.
    ///
    /// A name that is not found on the chip, but parses as a decimal offset,
    /// is treated as that offset.
    Name(String),
}

impl LineId {
    /// The offset, if the identifier is an offset.
    pub fn offset(&self) -> Option<Offset> {
        match self {
            LineId::Offset(o) => Some(*o),
            LineId::Name(_) => None,
        }
    }

    /// The name, if the identifier is a name.
    pub fn name(&self) -> Option<&str> {
        match self {
            LineId::Offset(_) => None,
            LineId::Name(n) => Some(n.as_str()),
        }
    }
}

impl From<Offset> for LineId {
    fn from(offset: Offset) -> Self {
        LineId::Offset(offset)
    }
}

impl From<&str> for LineId {
    fn from(name: &str) -> Self {
        LineId::Name(name.to_owned())
    }
}

impl From<String> for LineId {
    fn from(name: String) -> Self {
        LineId::Name(name)
    }
}

impl From<&String> for LineId {
    fn from(name: &String) -> Self {
        LineId::Name(name.clone())
    }
}

impl From<&LineId> for LineId {
    fn from(id: &LineId) -> Self {
        id.clone()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineId::Offset(o) => write!(f, "{}", o),
            LineId::Name(n) => write!(f, "{}", n),
        }
    }
}

/// The chip facts required to resolve a [`LineId`].
///
/// Implemented by [`Chip`](crate::Chip).
pub trait LineLookup {
    /// The number of lines on the chip.
    fn num_lines(&self) -> Result<u32>;

    /// The offset of the named line.
    ///
    /// Returns [`Error::LineNotFound`] if no line has that name.
    fn offset_of(&self, name: &str) -> Result<Offset>;

    /// The name of the line at the offset.
    ///
    /// The name is empty if the line is unnamed.
    fn name_of(&self, offset: Offset) -> Result<String>;
}

/// Resolve a line identifier to an offset on the chip.
///
/// Offsets must be within the range of the chip.
/// Names are looked up on the chip first and, only if not found, parsed as
/// a decimal offset.  If the fallback also fails the original not found
/// error is returned.
pub fn resolve<L: LineLookup + ?Sized>(chip: &L, id: &LineId) -> Result<Offset> {
    match id {
        LineId::Offset(offset) => {
            if *offset >= chip.num_lines()? {
                return Err(Error::InvalidOffset(*offset));
            }
            Ok(*offset)
        }
        LineId::Name(name) => match chip.offset_of(name) {
            Err(Error::LineNotFound(n)) => match name.parse::<Offset>() {
                Ok(offset) if offset < chip.num_lines()? => Ok(offset),
                _ => Err(Error::LineNotFound(n)),
            },
            res => res,
        },
    }
}
