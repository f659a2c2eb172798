// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A library for requesting and driving GPIO lines on Linux platforms
//! using the GPIO character device.
//!
//! Lines may be identified either by their offset on the chip or by their name,
//! and the two forms may be mixed freely within a request.
//!
//! The lines available on chips can be discovered using the [`chip`] module.
//!
//! Lines can be requested and manipulated using the [`request`] module.
//!
//! To request a pair of input lines, one by name and one by offset, and read them:
//! ```no_run
//! # use gpiolines::Result;
//! use gpiolines::line::{LineId, Settings};
//! use gpiolines::request::Config;
//!
//! # fn main() -> Result<()> {
//! let mut cfg = Config::default();
//! cfg.with_lines(
//!     [LineId::from("GPIO17"), LineId::from(22)],
//!     Settings::default().as_input(),
//! );
//! let req = gpiolines::request_lines("/dev/gpiochip0", &cfg)?;
//! let values = req.values()?;
//! # Ok(())
//! # }
//! ```
//!
//! [`chip`]: module@chip
//! [`request`]: module@request

use gpiocdev_uapi as uapi;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Types and functions specific to chips.
pub mod chip;
pub use chip::{is_chip, Chip};

/// Types specific to lines.
pub mod line;
pub use line::{LineId, Offset};

/// Types and functions related to requesting lines.
///
/// The [`Config`] collects groups of lines, identified by offset or name, and the
/// [`Settings`] to apply to each group.
/// The [`Builder`] submits a [`Config`] to a chip and returns the [`Request`] which
/// can access and manipulate the requested lines, and return edge events via
/// the [`EdgeEventBuffer`].
///
/// [`Builder`]: struct.Builder.html
/// [`Config`]: struct.Config.html
/// [`EdgeEventBuffer`]: struct.EdgeEventBuffer.html
/// [`Request`]: struct.Request.html
/// [`Settings`]: crate::line::Settings
pub mod request;
pub use request::{ReconfigurePolicy, Request, Warning};

#[cfg(any(feature = "async_tokio", feature = "async_io"))]
mod r#async;
#[cfg(feature = "async_io")]
pub use crate::r#async::async_io;
#[cfg(feature = "async_tokio")]
pub use crate::r#async::tokio;

/// Request a set of lines from the chip at `path`.
///
/// The chip is opened for the duration of the request only.
/// The returned [`Request`] does not depend on the chip remaining open.
///
/// # Examples
/// ```no_run
/// # fn example() -> gpiolines::Result<()> {
/// use gpiolines::line::{Settings, Value};
/// use gpiolines::request::Config;
///
/// let mut cfg = Config::default();
/// cfg.with_lines([3, 4], Settings::default().as_output(Value::Active));
/// let req = gpiolines::request_lines("/dev/gpiochip0", &cfg)?;
/// req.set_value(4, Value::Inactive)?;
/// # Ok(())
/// # }
/// ```
pub fn request_lines<P: AsRef<Path>>(path: P, cfg: &request::Config) -> Result<Request> {
    let chip = Chip::from_path(path)?;
    chip.request_lines(cfg)
}

/// Errors returned by [`gpiolines`] functions.
///
/// [`gpiolines`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error returned when there is a problem with an argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// The offset does not exist on the chip.
    #[error("line offset {0} out of range")]
    InvalidOffset(Offset),

    /// The same line was reached more than once while building a configuration.
    #[error("line must be configured exactly once - offset {0} repeats")]
    DuplicateOffset(Offset),

    /// The line is not part of the request.
    #[error("line {0} is not a requested line")]
    NotRequested(LineId),

    /// No line with the name exists on the chip.
    #[error("line \"{0}\" not found")]
    LineNotFound(String),

    /// Problem accessing GPIO chip character devices
    #[error("\"{0}\" {1}")]
    GpioChip(PathBuf, chip::ErrorKind),

    /// The chip has been closed.
    #[error("I/O operation on closed chip")]
    ChipClosed,

    /// The request has been released.
    #[error("GPIO lines have been released")]
    RequestReleased,

    /// An error returned from an underlying os call.
    #[error(transparent)]
    Os(#[from] std::io::Error),

    /// An error returned from an underlying uAPI call.
    #[error("uAPI {0} returned: {1}")]
    Uapi(UapiCall, #[source] uapi::Error),

    /// The response to a uAPI command contained unexpected content.
    #[error("uAPI returned an unexpected value for {0}: {1}")]
    UnexpectedResponse(UapiField, String),
}

impl Error {
    /// The broad class of the failure.
    pub fn category(&self) -> ErrorCategory {
        use ErrorCategory::*;
        match self {
            Error::InvalidArgument(_)
            | Error::InvalidOffset(_)
            | Error::DuplicateOffset(_)
            | Error::NotRequested(_) => Validation,
            Error::LineNotFound(_) => NotFound,
            Error::GpioChip(_, chip::ErrorKind::NotFound) => NotFound,
            Error::ChipClosed | Error::RequestReleased => State,
            Error::GpioChip(..)
            | Error::Os(_)
            | Error::Uapi(..)
            | Error::UnexpectedResponse(..) => Device,
        }
    }
}

/// The classes of [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    /// Malformed or out of range input, detected before reaching the kernel.
    Validation,

    /// A named line, chip or device path does not exist.
    NotFound,

    /// The chip is closed or the request released.
    State,

    /// A failure reported by the kernel or the OS.
    Device,
}

/// Identifiers for the underlying uAPI calls.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UapiCall {
    GetChipInfo,
    GetLine,
    GetLineInfo,
    GetLineValues,
    HasEvent,
    LEEFromBuf,
    LICEFromBuf,
    ReadEvent,
    SetLineConfig,
    SetLineValues,
    UnwatchLineInfo,
    WaitEvent,
    WatchLineInfo,
}

impl fmt::Display for UapiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UapiCall::GetChipInfo => "get_chip_info",
            UapiCall::GetLine => "get_line",
            UapiCall::GetLineInfo => "get_line_info",
            UapiCall::GetLineValues => "get_line_values",
            UapiCall::HasEvent => "has_event",
            UapiCall::LEEFromBuf => "LineEdgeEvent::from_slice",
            UapiCall::LICEFromBuf => "LineInfoChangeEvent::from_slice",
            UapiCall::ReadEvent => "read_event",
            UapiCall::SetLineConfig => "set_line_config",
            UapiCall::SetLineValues => "set_line_values",
            UapiCall::UnwatchLineInfo => "unwatch_line_info",
            UapiCall::WaitEvent => "wait_event",
            UapiCall::WatchLineInfo => "watch_line_info",
        };
        write!(f, "{}", name)
    }
}

/// Fields of uAPI structs that may contain values that cannot be decoded.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UapiField {
    Kind,
    NumAttrs,
}

impl fmt::Display for UapiField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UapiField::Kind => "kind",
            UapiField::NumAttrs => "num_attrs",
        };
        write!(f, "{}", name)
    }
}

/// The result for [`gpiolines`] functions.
///
/// [`gpiolines`]: crate
pub type Result<T> = std::result::Result<T, Error>;

// The longest single poll used when waiting without a timeout.
const WAIT_FOREVER_SLICE: Duration = Duration::from_secs(3600);

// Wait for the file to become readable.
//
// A timeout of None waits indefinitely, and a zero timeout does not block.
pub(crate) fn wait_readable(f: &File, timeout: Option<Duration>) -> Result<bool> {
    match timeout {
        Some(d) => {
            uapi::wait_event(f, d).map_err(|e| Error::Uapi(UapiCall::WaitEvent, e))
        }
        None => loop {
            if uapi::wait_event(f, WAIT_FOREVER_SLICE)
                .map_err(|e| Error::Uapi(UapiCall::WaitEvent, e))?
            {
                return Ok(true);
            }
        },
    }
}
