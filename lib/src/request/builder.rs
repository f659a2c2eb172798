// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::chip::Chip;
use crate::line::{LineId, Settings, Value};
use crate::request::{Config, ReconfigurePolicy, Request};
use crate::{Error, Result};
use std::path::PathBuf;

/// A builder of line requests.
///
/// Apply mutators to specify the chip and the request configuration, then use
/// [`request`] to request the lines from the kernel.
///
/// # Examples
/// Request and read a basic input line:
/// ```no_run
/// # fn example() -> gpiolines::Result<()> {
/// use gpiolines::line::Settings;
///
/// let req = gpiolines::Request::builder()
///     .on_chip("/dev/gpiochip0")
///     .with_line("GPIO22", Settings::default().as_input())
///     .request()?;
/// let value = req.value("GPIO22")?;
/// # Ok(())
/// # }
/// ```
///
/// More complex configurations can be built separately and provided
/// to the `Builder`:
///
/// ```no_run
/// # fn example() -> gpiolines::Result<()> {
/// use gpiolines::line::{Settings, Value};
/// use gpiolines::request::{Builder, Config};
///
/// let mut cfg = Config::default();
/// cfg.with_line(5, Settings::default().as_output(Value::Active));
/// let mut req = Builder::from_config(cfg)
///     .on_chip("/dev/gpiochip0")
///     .request()?;
/// req.set_value(5, Value::Inactive)?;
/// req.release()?;
/// # Ok(())
/// # }
/// ```
///
/// [`request`]: #method.request
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Builder {
    pub(super) chip: PathBuf,
    pub(super) cfg: Config,
    pub(super) policy: ReconfigurePolicy,
    pub(super) user_event_buffer_size: usize,
}

impl Builder {
    /// Start building a new request using the provided config.
    pub fn from_config(cfg: Config) -> Self {
        Builder {
            cfg,
            ..Default::default()
        }
    }

    /// Perform the request.
    ///
    /// The chip is opened for the duration of the request only.
    ///
    /// On success returns the [`Request`] that provides access to the requested lines.
    pub fn request(&self) -> Result<Request> {
        if self.chip.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("No chip specified.".into()));
        }
        let chip = Chip::from_path(&self.chip)?;
        Request::new(&chip, &self.cfg, self.policy, self.user_event_buffer_size)
    }

    /// Replace the request configuration with the new one provided.
    pub fn with_config(&mut self, cfg: Config) -> &mut Self {
        self.cfg = cfg;
        self
    }

    /// Get a snapshot of the current request configuration.
    pub fn config(&self) -> Config {
        self.cfg.clone()
    }

    /// Specify the path of the chip containing the lines.
    ///
    /// The path may be the device path, such as "/dev/gpiochip0",
    /// or a symlink to it.
    pub fn on_chip<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.chip = path.into();
        self
    }

    /// Add a line to the request.
    ///
    /// Refer to [`Config::with_line`].
    pub fn with_line<I, S>(&mut self, id: I, settings: S) -> &mut Self
    where
        I: Into<LineId>,
        S: Into<Option<Settings>>,
    {
        self.cfg.with_line(id, settings);
        self
    }

    /// Add a group of lines to the request.
    ///
    /// Refer to [`Config::with_lines`].
    pub fn with_lines<L, I, S>(&mut self, ids: L, settings: S) -> &mut Self
    where
        L: IntoIterator<Item = I>,
        I: Into<LineId>,
        S: Into<Option<Settings>>,
    {
        self.cfg.with_lines(ids, settings);
        self
    }

    /// Override the output value of a line.
    ///
    /// Refer to [`Config::with_output_value`].
    pub fn with_output_value<I: Into<LineId>>(&mut self, id: I, value: Value) -> &mut Self {
        self.cfg.with_output_value(id, value);
        self
    }

    /// Specify the consumer label to be applied to the request, and so to all lines
    /// in the request.
    ///
    /// If not specified, a label *"gpiolines-p**PID**"* is applied by [`request`],
    /// where **PID** is the process id of the application.
    ///
    /// [`request`]: #method.request
    pub fn with_consumer<N: Into<String>>(&mut self, consumer: N) -> &mut Self {
        self.cfg.with_consumer(consumer);
        self
    }

    /// Suggest the minimum number of events that the kernel should buffer.
    ///
    /// The kernel may allocate a larger buffer or cap the size of the buffer.
    /// If not specified, or zero, the kernel default is used.
    pub fn with_event_buffer_size(&mut self, event_buffer_size: u32) -> &mut Self {
        self.cfg.with_event_buffer_size(event_buffer_size);
        self
    }

    /// Set the number of events the [`Request::edge_events`] iterator reads
    /// from the kernel at once.
    ///
    /// If not specified, or zero, [`DEFAULT_EVENT_BATCH_SIZE`](super::DEFAULT_EVENT_BATCH_SIZE)
    /// is used.
    pub fn with_user_event_buffer_size(&mut self, event_buffer_size: usize) -> &mut Self {
        self.user_event_buffer_size = event_buffer_size;
        self
    }

    /// Set how [`Request::reconfigure`] treats lines omitted from the new config.
    pub fn with_reconfigure_policy(&mut self, policy: ReconfigurePolicy) -> &mut Self {
        self.policy = policy;
        self
    }
}

pub(super) fn default_consumer() -> String {
    format!("gpiolines-p{}", std::process::id())
}
