// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::line::{self, Direction, LineId, LineLookup, Offset, Settings, Value};
use crate::{Error, Result};
use gpiocdev_uapi::{v2, NUM_LINES_MAX};
use std::collections::HashMap;

/// The mapping from line names to offsets for the lines in a request.
pub type NameMap = HashMap<String, Offset>;

/// The configuration for a request for one or more lines.
///
/// The configuration is an ordered list of groups of lines, each identified by
/// offset or name, and the settings to apply to every line in the group.
/// A group without settings is requested with the default [`Settings`].
///
/// The order in which lines are added determines the order of the lines in
/// the resulting request.
///
/// Every line must be configured exactly once.  Reaching the same line
/// twice, whether via the same identifier or via a name and an offset that
/// refer to the same line, is an error when the configuration is resolved.
///
/// # Examples
/// ```
/// use gpiolines::line::{Bias, EdgeDetection, Settings, Value};
/// use gpiolines::request::Config;
///
/// let mut cfg = Config::default();
/// cfg.with_lines(
///     ["BUTTON", "DOOR"],
///     Settings::default()
///         .as_input()
///         .with_bias(Bias::PullUp)
///         .with_edge_detection(EdgeDetection::Both),
/// )
/// .with_line(7, Settings::default().as_output(Value::Inactive))
/// .with_output_value(7, Value::Active)
/// .with_consumer("door-monitor");
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    entries: Vec<(Vec<LineId>, Option<Settings>)>,

    output_values: Vec<(LineId, Value)>,

    pub(crate) consumer: Option<String>,

    pub(crate) event_buffer_size: u32,
}

impl Config {
    /// Add a single line to the configuration.
    ///
    /// `settings` may be `None` to request the line with default settings,
    /// or to leave the line unchanged when reconfiguring.
    pub fn with_line<I, S>(&mut self, id: I, settings: S) -> &mut Self
    where
        I: Into<LineId>,
        S: Into<Option<Settings>>,
    {
        self.entries.push((vec![id.into()], settings.into()));
        self
    }

    /// Add a group of lines sharing the same settings to the configuration.
    pub fn with_lines<L, I, S>(&mut self, ids: L, settings: S) -> &mut Self
    where
        L: IntoIterator<Item = I>,
        I: Into<LineId>,
        S: Into<Option<Settings>>,
    {
        let ids: Vec<LineId> = ids.into_iter().map(Into::into).collect();
        self.entries.push((ids, settings.into()));
        self
    }

    /// Override the output value for a line.
    ///
    /// Once any override is set, every output line not explicitly overridden
    /// is driven inactive, regardless of the output value in its settings.
    ///
    /// Overriding a line that is not part of the config is not ignored.
    /// The request fails with [`Error::NotRequested`].
    pub fn with_output_value<I: Into<LineId>>(&mut self, id: I, value: Value) -> &mut Self {
        let id = id.into();
        match self.output_values.iter_mut().find(|(i, _)| *i == id) {
            Some(entry) => entry.1 = value,
            None => self.output_values.push((id, value)),
        }
        self
    }

    /// Override the output values for a set of lines.
    pub fn with_output_values<V, I>(&mut self, values: V) -> &mut Self
    where
        V: IntoIterator<Item = (I, Value)>,
        I: Into<LineId>,
    {
        for (id, value) in values {
            self.with_output_value(id, value);
        }
        self
    }

    /// Set the consumer label for the request.
    ///
    /// If not set a label based on the process id is used.
    pub fn with_consumer<S: Into<String>>(&mut self, consumer: S) -> &mut Self {
        self.consumer = Some(consumer.into());
        self
    }

    /// Suggest the size of the kernel edge event buffer.
    ///
    /// Zero selects the kernel default.
    pub fn with_event_buffer_size(&mut self, event_buffer_size: u32) -> &mut Self {
        self.event_buffer_size = event_buffer_size;
        self
    }

    /// The groups of lines and their settings, in the order added.
    pub fn entries(&self) -> &[(Vec<LineId>, Option<Settings>)] {
        &self.entries
    }

    /// The output value overrides, in the order added.
    pub fn output_values(&self) -> &[(LineId, Value)] {
        &self.output_values
    }

    /// Resolve all identifiers against the chip.
    ///
    /// Fails if any line cannot be found, if any line is configured more than
    /// once, or if an output value refers to a line not in the configuration.
    pub fn resolve<L: LineLookup + ?Sized>(&self, chip: &L) -> Result<Resolved> {
        if self.entries.iter().all(|(ids, _)| ids.is_empty()) {
            return Err(Error::InvalidArgument("no lines specified".into()));
        }
        let mut offsets: Vec<Offset> = Vec::new();
        let mut name_map = NameMap::new();
        let mut lines = Vec::new();
        let mut blocks = Vec::with_capacity(self.entries.len());
        for (ids, settings) in &self.entries {
            let mut block = Vec::with_capacity(ids.len());
            for id in ids {
                let offset = line::resolve(chip, id)?;
                if offsets.contains(&offset) {
                    return Err(Error::DuplicateOffset(offset));
                }
                match id {
                    // names explicitly requested take precedence over chip names
                    LineId::Name(name) => {
                        name_map.insert(name.clone(), offset);
                    }
                    LineId::Offset(_) => {
                        let name = chip.name_of(offset)?;
                        if !name.is_empty() {
                            name_map.entry(name).or_insert(offset);
                        }
                    }
                }
                offsets.push(offset);
                block.push(offset);
                lines.push(id.clone());
            }
            blocks.push((block, settings.clone().unwrap_or_default()));
        }
        if offsets.len() > NUM_LINES_MAX {
            return Err(Error::InvalidArgument(format!(
                "{} lines requested, but only {} lines can be requested at once",
                offsets.len(),
                NUM_LINES_MAX
            )));
        }
        let output_values = if self.output_values.is_empty() {
            None
        } else {
            let mut overrides = HashMap::new();
            for (id, value) in &self.output_values {
                let offset = line::resolve(chip, id)?;
                if !offsets.contains(&offset) {
                    return Err(Error::NotRequested(id.clone()));
                }
                overrides.insert(offset, *value);
            }
            Some(
                offsets
                    .iter()
                    .map(|o| overrides.get(o).copied().unwrap_or_default())
                    .collect(),
            )
        };
        Ok(Resolved {
            blocks,
            output_values,
            name_map,
            lines,
        })
    }
}

/// A [`Config`] with every line resolved to an offset on a particular chip.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Resolved {
    /// The groups of offsets and the settings for each group.
    ///
    /// Groups configured without settings are assigned the default settings.
    pub blocks: Vec<(Vec<Offset>, Settings)>,

    /// The output values, if any were overridden, for each line in the
    /// order the lines appear in `blocks`.
    pub output_values: Option<Vec<Value>>,

    /// The map from name to offset for the named lines in the request.
    pub name_map: NameMap,

    /// The identifiers of the requested lines, as originally provided.
    pub lines: Vec<LineId>,
}

impl Resolved {
    /// The offsets of all the lines, in request order.
    pub fn offsets(&self) -> Vec<Offset> {
        self.blocks
            .iter()
            .flat_map(|(offsets, _)| offsets.iter().copied())
            .collect()
    }

    /// The settings for each line, in request order.
    ///
    /// Any output value override replaces the output value from the settings.
    pub fn line_settings(&self) -> Vec<Settings> {
        let mut settings: Vec<Settings> = self
            .blocks
            .iter()
            .flat_map(|(offsets, s)| offsets.iter().map(move |_| s.clone()))
            .collect();
        if let Some(values) = &self.output_values {
            for (s, v) in settings.iter_mut().zip(values) {
                s.output_value = *v;
            }
        }
        settings
    }
}

// Pack per-line settings into a v2 line config.
//
// Bits in the attribute masks refer to the index of the line in `lines`.
pub(crate) fn line_config_v2(lines: &[Settings]) -> Result<v2::LineConfig> {
    // attr values paired with the set of lines using them, in first-seen order.
    let mut flags: Vec<(v2::LineFlags, LineSet)> = Vec::new();
    let mut debounced: Vec<(u32, LineSet)> = Vec::new();
    let mut values = v2::LineValues::default();
    for (idx, s) in lines.iter().enumerate() {
        let mask: LineSet = 1 << idx;
        let lflags = v2::LineFlags::from(s);
        match flags.iter_mut().find(|(f, _)| *f == lflags) {
            Some((_, bits)) => *bits |= mask,
            None => flags.push((lflags, mask)),
        }
        let dp_us = s.debounce_us();
        if dp_us != 0 {
            match debounced.iter_mut().find(|(d, _)| *d == dp_us) {
                Some((_, bits)) => *bits |= mask,
                None => debounced.push((dp_us, mask)),
            }
        }
        if s.direction == Direction::Output {
            values.set(idx, s.output_value.into());
        }
    }
    // The most common flags become the base flags, ties going to the first seen.
    let mut base = 0;
    for (idx, (_, bits)) in flags.iter().enumerate() {
        if bits.count_ones() > flags[base].1.count_ones() {
            base = idx;
        }
    }
    // the kernel defaults output values to inactive, so can be skipped if all inactive.
    let has_values = values.bits != 0;
    let num_attrs = flags.len().saturating_sub(1) + debounced.len() + usize::from(has_values);
    if num_attrs > v2::NUM_ATTRS_MAX {
        return Err(Error::InvalidArgument(format!(
            "configuration requires {} attributes, but only {} are supported",
            num_attrs,
            v2::NUM_ATTRS_MAX
        )));
    }
    let mut cfg = v2::LineConfig {
        flags: flags.get(base).map(|(f, _)| *f).unwrap_or_default(),
        ..Default::default()
    };
    for (idx, (f, bits)) in flags.iter().enumerate() {
        if idx != base {
            cfg.add_flags(*f, *bits);
        }
    }
    if has_values {
        cfg.add_values(&values);
    }
    for (dp, bits) in debounced.iter() {
        cfg.add_debounce(*dp, *bits);
    }
    Ok(cfg)
}

type LineSet = u64;
