// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod builder;
pub use self::builder::Builder;
use self::builder::default_consumer;

mod config;
pub use self::config::{Config, NameMap, Resolved};
use self::config::line_config_v2;

mod edge_event_buffer;
pub use self::edge_event_buffer::EdgeEventBuffer;

use crate::chip::Chip;
use crate::line::{EdgeEvent, LineId, Offset, Settings, Value};
use crate::{Error, Result, UapiCall};
use gpiocdev_uapi::v2;
use std::fmt;
use std::fs::File;
use std::mem;
use std::os::unix::prelude::{AsFd, AsRawFd, BorrowedFd};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, warn};

/// The number of edge events read from the kernel at once, unless otherwise specified.
pub const DEFAULT_EVENT_BATCH_SIZE: usize = 64;

/// How [`Request::reconfigure`] treats requested lines that are not
/// mentioned in the new config.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ReconfigurePolicy {
    /// Lines omitted from the config, or configured without settings, keep
    /// their current settings.
    ///
    /// Identifiers that are not part of the request are reported as
    /// [`Warning`]s and otherwise ignored.
    #[default]
    PreserveOmitted,

    /// Lines omitted from the config, or configured without settings, are
    /// reset to the default settings.
    ///
    /// Identifiers that are not part of the request are an error.
    ResetOmitted,
}

/// A non-fatal problem detected while reconfiguring a request.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Warning {
    /// The line is not part of the request, so its settings were ignored.
    NotRequested(LineId),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NotRequested(id) => write!(f, "line {} is not a requested line - ignored", id),
        }
    }
}

/// An active request of a set of lines.
///
/// Requests are made by [`Chip::request_lines`], [`request_lines`](crate::request_lines)
/// or the [`Builder`].
///
/// Lines in the request may be addressed by offset or by name.
/// Names are those used to request the lines, or the chip's names for lines
/// requested by offset.  Where several requested lines share a chip name,
/// the first in the request is the one addressable by that name.
///
/// # Output Lifetime
///
/// The value of an output line is only guaranteed for the lifetime of the request.
/// If the request is released or dropped then the output value becomes
/// indeterminate.
///
/// # Event Buffering
///
/// The [`read_edge_event`] reads a single event onto the stack.
///
/// The [`read_edge_events`] and [`EdgeEventBuffer`] read multiple events from
/// the kernel at once, reducing the reading overheads for bursts of events.
///
/// # Releasing
///
/// Once [`release`]d, every operation on the request fails with [`Error::RequestReleased`].
///
/// [`read_edge_event`]: #method.read_edge_event
/// [`read_edge_events`]: #method.read_edge_events
/// [`release`]: #method.release
#[derive(Debug)]
pub struct Request {
    /// The request file, or None once released.
    f: Option<File>,

    chip_name: String,

    /// The offsets of the requested lines, in request order.
    offsets: Vec<Offset>,

    /// The identifiers used to request the lines.
    lines: Vec<LineId>,

    name_map: NameMap,

    /// A snapshot of the active settings for each line, in request order.
    settings: RwLock<Vec<Settings>>,

    policy: ReconfigurePolicy,

    /// The size of the user buffer created for the `edge_events` iterator.
    user_event_buffer_size: usize,
}

impl Request {
    /// Start building a new request.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn example() -> gpiolines::Result<()> {
    /// let req = gpiolines::Request::builder()
    ///     .on_chip("/dev/gpiochip0")
    ///     .with_lines([3, 5], None)
    ///     .request()?;
    /// let values = req.values()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Start building a new request using the provided config.
    pub fn from_config(config: Config) -> Builder {
        Builder::from_config(config)
    }

    pub(crate) fn new(
        chip: &Chip,
        cfg: &Config,
        policy: ReconfigurePolicy,
        user_event_buffer_size: usize,
    ) -> Result<Request> {
        let resolved = cfg.resolve(chip)?;
        let offsets = resolved.offsets();
        let settings = resolved.line_settings();
        let consumer = cfg.consumer.clone().unwrap_or_else(default_consumer);
        let lr = v2::LineRequest {
            offsets: v2::Offsets::from_slice(&offsets),
            consumer: consumer.as_str().into(),
            event_buffer_size: cfg.event_buffer_size,
            num_lines: offsets.len() as u32,
            config: line_config_v2(&settings)?,
            ..Default::default()
        };
        let f = v2::get_line(chip.file()?, lr).map_err(|e| Error::Uapi(UapiCall::GetLine, e))?;
        let chip_name = chip.name()?;
        debug!(chip = %chip_name, ?offsets, %consumer, "requested lines");
        Ok(Request {
            f: Some(f),
            chip_name,
            offsets,
            lines: resolved.lines,
            name_map: resolved.name_map,
            settings: RwLock::new(settings),
            policy,
            user_event_buffer_size: if user_event_buffer_size == 0 {
                DEFAULT_EVENT_BATCH_SIZE
            } else {
                user_event_buffer_size
            },
        })
    }

    fn file(&self) -> Result<&File> {
        self.f.as_ref().ok_or(Error::RequestReleased)
    }

    fn read_settings(&self) -> RwLockReadGuard<'_, Vec<Settings>> {
        self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_settings(&self) -> RwLockWriteGuard<'_, Vec<Settings>> {
        self.settings.write().unwrap_or_else(PoisonError::into_inner)
    }

    // The index of the line within the request.
    fn index_of(&self, id: &LineId) -> Option<usize> {
        let offset = match id {
            LineId::Offset(o) => *o,
            // names never requested are not in the map, even if numeric
            LineId::Name(n) => *self.name_map.get(n)?,
        };
        self.offsets.iter().position(|o| *o == offset)
    }

    fn requested_index(&self, id: &LineId) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| Error::NotRequested(id.clone()))
    }

    /// The name of the chip the lines were requested from.
    pub fn chip_name(&self) -> Result<&str> {
        self.file()?;
        Ok(&self.chip_name)
    }

    /// The number of lines in the request.
    pub fn num_lines(&self) -> Result<usize> {
        self.file()?;
        Ok(self.offsets.len())
    }

    /// The offsets of the requested lines, in request order.
    pub fn offsets(&self) -> Result<&[Offset]> {
        self.file()?;
        Ok(&self.offsets)
    }

    /// The identifiers used to request the lines, in request order.
    pub fn lines(&self) -> Result<&[LineId]> {
        self.file()?;
        Ok(&self.lines)
    }

    /// The map from name to offset for the named lines in the request.
    pub fn name_map(&self) -> Result<&NameMap> {
        self.file()?;
        Ok(&self.name_map)
    }

    /// The file descriptor of the request.
    pub fn fd(&self) -> Result<BorrowedFd<'_>> {
        Ok(self.file()?.as_fd())
    }

    /// The policy applied by [`reconfigure`](#method.reconfigure).
    pub fn reconfigure_policy(&self) -> ReconfigurePolicy {
        self.policy
    }

    /// A snapshot of the active settings of the requested lines, in request order.
    pub fn settings(&self) -> Result<Vec<Settings>> {
        self.file()?;
        Ok(self.read_settings().clone())
    }

    /// The active settings of one requested line.
    pub fn line_settings<I: Into<LineId>>(&self, id: I) -> Result<Settings> {
        self.file()?;
        let idx = self.requested_index(&id.into())?;
        Ok(self.read_settings()[idx].clone())
    }

    /// Get the value of one line in the request.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example(req: gpiolines::Request) -> gpiolines::Result<()> {
    /// let v5 = req.value(5)?;
    /// let led = req.value("LED")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn value<I: Into<LineId>>(&self, id: I) -> Result<Value> {
        let mut values = self.values_of([id])?;
        values.pop().ok_or_else(|| Error::InvalidArgument("no lines specified".into()))
    }

    /// Get the values of all the lines in the request, in request order.
    pub fn values(&self) -> Result<Vec<Value>> {
        let f = self.file()?;
        let idxs: Vec<usize> = (0..self.offsets.len()).collect();
        get_values(f, &idxs)
    }

    /// Get the values of a subset of the lines in the request.
    ///
    /// The values are returned in the order of `ids`, so an empty `ids`
    /// returns no values.
    pub fn values_of<L, I>(&self, ids: L) -> Result<Vec<Value>>
    where
        L: IntoIterator<Item = I>,
        I: Into<LineId>,
    {
        let f = self.file()?;
        let idxs = ids
            .into_iter()
            .map(|id| self.requested_index(&id.into()))
            .collect::<Result<Vec<usize>>>()?;
        if idxs.is_empty() {
            return Ok(Vec::new());
        }
        get_values(f, &idxs)
    }

    /// Set the value of one line in the request.
    pub fn set_value<I: Into<LineId>>(&self, id: I, value: Value) -> Result<()> {
        self.set_values([(id, value)])
    }

    /// Set the values of a subset of the lines in the request.
    ///
    /// If a line is listed more than once the last value applies.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example(req: gpiolines::Request) -> gpiolines::Result<()> {
    /// use gpiolines::line::{LineId, Value};
    ///
    /// req.set_values([(LineId::from(3), Value::Active), (LineId::from("LED"), Value::Inactive)])?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_values<V, I>(&self, values: V) -> Result<()>
    where
        V: IntoIterator<Item = (I, Value)>,
        I: Into<LineId>,
    {
        let f = self.file()?;
        let mut vals = v2::LineValues::default();
        let mut updates = Vec::new();
        for (id, value) in values {
            let idx = self.requested_index(&id.into())?;
            vals.set(idx, value.into());
            updates.push((idx, value));
        }
        if updates.is_empty() {
            return Ok(());
        }
        v2::set_line_values(f, &vals).map_err(|e| Error::Uapi(UapiCall::SetLineValues, e))?;
        let mut settings = self.write_settings();
        for (idx, value) in updates {
            settings[idx].output_value = value;
        }
        Ok(())
    }

    /// Reconfigure the requested lines, applying the policy set when the
    /// request was built.
    ///
    /// Refer to [`reconfigure_with`](#method.reconfigure_with).
    pub fn reconfigure(&self, cfg: &Config) -> Result<Vec<Warning>> {
        self.reconfigure_with(cfg, self.policy)
    }

    /// Reconfigure the requested lines.
    ///
    /// Lines are identified by offset or name, as for requests, but only lines
    /// in this request may be reconfigured.  The set of requested lines, and
    /// their order, is unchanged.  Every line must be configured at most once.
    ///
    /// The treatment of omitted lines, and of identifiers that are not part of
    /// the request, depends on the `policy`.
    ///
    /// Output value overrides in the config apply only to the lines listed.
    ///
    /// Returns any non-fatal warnings, each reported once per call.
    pub fn reconfigure_with(&self, cfg: &Config, policy: ReconfigurePolicy) -> Result<Vec<Warning>> {
        let f = self.file()?;
        let mut warnings = Vec::new();
        let mut not_requested = |id: &LineId| -> Result<()> {
            if policy == ReconfigurePolicy::ResetOmitted {
                return Err(Error::NotRequested(id.clone()));
            }
            let w = Warning::NotRequested(id.clone());
            if !warnings.contains(&w) {
                warn!(chip = %self.chip_name, line = %id, "ignoring line not in request");
                warnings.push(w);
            }
            Ok(())
        };
        let mut updates: Vec<Option<Option<Settings>>> = vec![None; self.offsets.len()];
        for (ids, settings) in cfg.entries() {
            for id in ids {
                match self.index_of(id) {
                    Some(idx) => {
                        if updates[idx].is_some() {
                            return Err(Error::DuplicateOffset(self.offsets[idx]));
                        }
                        updates[idx] = Some(settings.clone());
                    }
                    None => not_requested(id)?,
                }
            }
        }
        let mut overrides = Vec::new();
        for (id, value) in cfg.output_values() {
            match self.index_of(id) {
                Some(idx) => overrides.push((idx, *value)),
                None => not_requested(id)?,
            }
        }
        let mut settings = self.write_settings();
        let mut lines: Vec<Settings> = updates
            .into_iter()
            .zip(settings.iter())
            .map(|(update, current)| match (update.flatten(), policy) {
                (Some(s), _) => s,
                (None, ReconfigurePolicy::PreserveOmitted) => current.clone(),
                (None, ReconfigurePolicy::ResetOmitted) => Settings::default(),
            })
            .collect();
        for (idx, value) in overrides {
            lines[idx].output_value = value;
        }
        let lc = line_config_v2(&lines)?;
        v2::set_line_config(f, lc).map_err(|e| Error::Uapi(UapiCall::SetLineConfig, e))?;
        debug!(chip = %self.chip_name, offsets = ?self.offsets, ?policy, "reconfigured lines");
        *settings = lines;
        Ok(warnings)
    }

    /// Release the requested lines.
    ///
    /// Subsequent operations on the request fail with [`Error::RequestReleased`],
    /// including a second release.
    pub fn release(&mut self) -> Result<()> {
        match self.f.take() {
            Some(f) => {
                drop(f);
                debug!(chip = %self.chip_name, offsets = ?self.offsets, "released lines");
                Ok(())
            }
            None => Err(Error::RequestReleased),
        }
    }

    /// Returns true once the request has been released.
    pub fn is_released(&self) -> bool {
        self.f.is_none()
    }

    /// An iterator over edge events read from the request.
    ///
    /// Blocks until events are available.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example() -> gpiolines::Result<()> {
    /// use gpiolines::line::{EdgeDetection, Settings};
    ///
    /// let req = gpiolines::Request::builder()
    ///     .on_chip("/dev/gpiochip0")
    ///     .with_consumer("watcher")
    ///     .with_line(23, Settings::default().with_edge_detection(EdgeDetection::Both))
    ///     .request()?;
    ///
    /// for event in req.edge_events()? {
    ///     println!("{}", event?);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn edge_events(&self) -> Result<EdgeEventBuffer<'_>> {
        self.new_edge_event_buffer(self.user_event_buffer_size)
    }

    /// Returns true when the request has edge events available to read.
    pub fn has_edge_event(&self) -> Result<bool> {
        gpiocdev_uapi::has_event(self.file()?).map_err(|e| Error::Uapi(UapiCall::HasEvent, e))
    }

    /// Wait for edge events to be available.
    ///
    /// A `timeout` of `None` waits indefinitely, and a zero `timeout` does not block.
    ///
    /// Returns true if [`read_edge_event`] will return an event without blocking.
    ///
    /// [`read_edge_event`]: #method.read_edge_event
    pub fn wait_edge_events(&self, timeout: Option<Duration>) -> Result<bool> {
        crate::wait_readable(self.file()?, timeout)
    }

    /// Read a single edge event from the request.
    ///
    /// Will block until an edge event is available.
    pub fn read_edge_event(&self) -> Result<EdgeEvent> {
        let mut buf = [0_u64; mem::size_of::<v2::LineEdgeEvent>() / 8];
        let n = self.read_edge_events_into_slice(&mut buf)?;
        self.edge_event_from_slice(&buf[0..n])
    }

    /// Read the edge events currently available from the request.
    ///
    /// Will block until at least one edge event is available.
    ///
    /// * `max_events` - The maximum number of events to read, defaulting to
    ///   [`DEFAULT_EVENT_BATCH_SIZE`].
    pub fn read_edge_events(&self, max_events: Option<usize>) -> Result<Vec<EdgeEvent>> {
        let max_events = max_events.unwrap_or(DEFAULT_EVENT_BATCH_SIZE).max(1);
        let evt_size = self.edge_event_u64_size();
        let mut buf = vec![0_u64; max_events * evt_size];
        let n = self.read_edge_events_into_slice(&mut buf)?;
        buf[0..n]
            .chunks_exact(evt_size)
            .map(|evt| self.edge_event_from_slice(evt))
            .collect()
    }

    /// Create an edge event buffer.
    ///
    /// * `capacity` - The number of events that can be buffered.
    pub fn new_edge_event_buffer(&self, capacity: usize) -> Result<EdgeEventBuffer<'_>> {
        self.file()?;
        Ok(EdgeEventBuffer::new(self, self.edge_event_u64_size(), capacity))
    }

    /// Read edge events from the kernel into a user space `[u64]` slice.
    ///
    /// The slice is `u64` to satisfy alignment requirements on 32bit platforms.
    ///
    /// This reads in [`edge_event_u64_size`] sized chunks so `buf` must be at least
    /// as large as one event, e.g. `vec![0_u64; edge_event_u64_size()]`
    ///
    /// This function will block if no events are available to read.
    ///
    /// Returns the number of u64 words read.
    ///
    /// [`edge_event_u64_size`]: #method.edge_event_u64_size
    pub fn read_edge_events_into_slice(&self, buf: &mut [u64]) -> Result<usize> {
        gpiocdev_uapi::read_event(self.file()?, buf).map_err(|e| Error::Uapi(UapiCall::ReadEvent, e))
    }

    /// Read an edge event from a `[u64]` slice.
    ///
    /// Assumes the buffer has been previously populated by a call to
    /// [`read_edge_events_into_slice`].
    ///
    /// [`read_edge_events_into_slice`]: #method.read_edge_events_into_slice
    pub fn edge_event_from_slice(&self, buf: &[u64]) -> Result<EdgeEvent> {
        EdgeEvent::try_from(
            v2::LineEdgeEvent::from_slice(buf).map_err(|e| Error::Uapi(UapiCall::LEEFromBuf, e))?,
        )
    }

    /// The number of u64s required to buffer a single edge event.
    pub fn edge_event_u64_size(&self) -> usize {
        mem::size_of::<v2::LineEdgeEvent>() / 8
    }

    /// The number of bytes required to buffer a single edge event.
    pub fn edge_event_size(&self) -> usize {
        mem::size_of::<v2::LineEdgeEvent>()
    }
}

fn get_values(f: &File, idxs: &[usize]) -> Result<Vec<Value>> {
    let mut vals = v2::LineValues::default();
    for &idx in idxs {
        vals.mask |= 0x01 << idx;
    }
    v2::get_line_values(f, &mut vals).map_err(|e| Error::Uapi(UapiCall::GetLineValues, e))?;
    Ok(idxs
        .iter()
        .map(|&idx| Value::from(vals.bits & (0x01 << idx) != 0))
        .collect())
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.f {
            Some(file) => write!(
                f,
                "<LineRequest chip=\"{}\" num_lines={} offsets={:?} fd={}>",
                self.chip_name,
                self.offsets.len(),
                self.offsets,
                file.as_raw_fd()
            ),
            None => write!(f, "<LineRequest RELEASED>"),
        }
    }
}
