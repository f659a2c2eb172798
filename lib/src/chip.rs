// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::line::{self, InfoChangeEvent, LineId, LineLookup, Offset};
use crate::request::{Config, ReconfigurePolicy, Request};
use crate::{Error, Result, UapiCall};
use gpiocdev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::mem;
use std::ops::Range;
use std::os::linux::fs::MetadataExt;
use std::os::unix::prelude::{AsFd, AsRawFd, BorrowedFd, OsStrExt};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

const CHARDEV_MODE: u32 = 0x2000;

/// Check if a path corresponds to a GPIO character device.
///
/// Returns the resolved path to the character device.
pub fn is_chip<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let pb = fs::canonicalize(&path).map_err(|e| not_found(path.as_ref(), e))?;
    // if canonical path is of form /dev/gpiochipXX assume we are good
    if let Some(pbstr) = pb.to_str() {
        if let Some(num) = pbstr.strip_prefix("/dev/gpiochip") {
            if !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()) {
                return Ok(pb);
            }
        }
    }

    // else take a more detailed look...
    let m = fs::metadata(&pb).map_err(|e| not_found(&pb, e))?;
    if m.st_mode() & CHARDEV_MODE == 0 {
        return Err(Error::GpioChip(pb, ErrorKind::NotCharacterDevice));
    }
    if let Some(name) = pb.file_name() {
        let mut sysfs_dev = PathBuf::from("/sys/bus/gpio/devices");
        sysfs_dev.push(name);
        sysfs_dev.push("dev");
        if let Ok(rdev) = fs::read_to_string(sysfs_dev) {
            let st_rdev = m.st_rdev();
            let dev_str = format!("{}:{}", major(st_rdev), minor(st_rdev));
            if rdev.trim_end() == dev_str {
                return Ok(pb);
            }
        }
    }
    Err(Error::GpioChip(pb, ErrorKind::NotGpioDevice))
}

// device number split, as laid out by glibc
fn major(dev: u64) -> u64 {
    ((dev >> 32) & 0xffff_f000) | ((dev >> 8) & 0x0000_0fff)
}

fn minor(dev: u64) -> u64 {
    ((dev >> 12) & 0xffff_ff00) | (dev & 0x0000_00ff)
}

fn not_found(path: &Path, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::GpioChip(path.to_path_buf(), ErrorKind::NotFound)
    } else {
        Error::Os(e)
    }
}

/// Compare two chip paths.
///
// Sorts paths naturally, assuming any chip numbering is at the end of the path - as it is for gpiochips.
pub fn path_compare(a: &Path, b: &Path) -> std::cmp::Ordering {
    let a = a.as_os_str().as_bytes();
    let b = b.as_os_str().as_bytes();

    if a.len() == b.len() {
        return a.cmp(b);
    }
    for (ai, bi) in a.iter().zip(b.iter()) {
        if *ai != *bi {
            if !ai.is_ascii_digit() || !bi.is_ascii_digit() {
                // if either is not a digit then this character is definitive
                return (*ai).cmp(bi);
            }
            break;
        }
    }
    // equal up to the length of the shortest, or to digits, and shorter numbers are smaller
    a.len().cmp(&b.len())
}

/// Returns the paths of all the GPIO character devices on the system.
///
/// The returned paths are sorted in name order and are confirmed to be GPIO character devices,
/// so there is no need to check them with [`is_chip`].
pub fn chips() -> Result<Vec<PathBuf>> {
    let mut chips = fs::read_dir("/dev")?
        .filter_map(|x| x.ok())
        .flat_map(|de| is_chip(de.path()))
        .collect::<Vec<PathBuf>>();
    chips.sort_unstable_by(|a, b| path_compare(a, b));
    chips.dedup();
    Ok(chips)
}

/// An iterator that returns the info for each line on the [`Chip`].
pub struct LineInfoIterator<'a> {
    chip: &'a Chip,
    offsets: Range<Offset>,
}

impl<'a> Iterator for LineInfoIterator<'a> {
    type Item = Result<line::Info>;

    fn next(&mut self) -> Option<Result<line::Info>> {
        self.offsets
            .next()
            .map(|offset| self.chip.line_info(offset))
    }
}

/// A GPIO character device.
///
/// The chip remains open until [`close`](#method.close)d or dropped.
/// Once closed every operation on the chip fails with [`Error::ChipClosed`].
#[derive(Debug)]
pub struct Chip {
    /// The resolved path of the GPIO character device.
    path: PathBuf,

    /// The open GPIO character device file, or None once closed.
    f: Option<fs::File>,

    /// The chip info, read on first use.
    info: OnceLock<Info>,
}

impl Chip {
    /// Constructs a Chip using the given path.
    ///
    /// The path must resolve to a valid GPIO character device.
    ///
    /// # Examples
    ///```no_run
    /// # fn example() -> gpiolines::Result<gpiolines::Chip>{
    /// let chip = gpiolines::Chip::from_path("/dev/gpiochip0")?;
    /// # Ok(chip)
    /// # }
    ///```
    pub fn from_path<P: AsRef<Path>>(p: P) -> Result<Chip> {
        let path = is_chip(p.as_ref())?;
        let f = fs::File::open(&path)?;
        debug!(path = %path.display(), "opened chip");
        Ok(Chip {
            path,
            f: Some(f),
            info: OnceLock::new(),
        })
    }

    /// Constructs a Chip using the given name.
    ///
    /// The name must resolve to a valid GPIO character device.
    ///
    /// # Examples
    ///```no_run
    /// # fn example() -> gpiolines::Result<gpiolines::Chip>{
    /// let chip = gpiolines::Chip::from_name("gpiochip0")?;
    /// # Ok(chip)
    /// # }
    ///```
    pub fn from_name(n: &str) -> Result<Chip> {
        Chip::from_path(format!("/dev/{}", n))
    }

    pub(crate) fn file(&self) -> Result<&fs::File> {
        self.f.as_ref().ok_or(Error::ChipClosed)
    }

    /// Close the chip.
    ///
    /// Requests made from the chip are unaffected.
    /// Closing a chip that is already closed is an error.
    pub fn close(&mut self) -> Result<()> {
        match self.f.take() {
            Some(f) => {
                drop(f);
                debug!(path = %self.path.display(), "closed chip");
                Ok(())
            }
            None => Err(Error::ChipClosed),
        }
    }

    /// Returns true once the chip has been closed.
    pub fn is_closed(&self) -> bool {
        self.f.is_none()
    }

    /// Get the information for the chip.
    ///
    /// The information is read from the kernel on the first call and
    /// cached for subsequent calls.
    pub fn info(&self) -> Result<Info> {
        let f = self.file()?;
        if let Some(info) = self.info.get() {
            return Ok(info.clone());
        }
        let info = Info::from(
            v2::get_chip_info(f).map_err(|e| Error::Uapi(UapiCall::GetChipInfo, e))?,
        );
        Ok(self.info.get_or_init(|| info).clone())
    }

    /// Return the name of the chip, as reported by the kernel.
    pub fn name(&self) -> Result<String> {
        Ok(self.info()?.name)
    }

    /// Return the path of the chip.
    pub fn path(&self) -> &Path {
        self.path.as_ref()
    }

    /// The file descriptor of the chip.
    pub fn fd(&self) -> Result<BorrowedFd<'_>> {
        Ok(self.file()?.as_fd())
    }

    /// Map a line identifier to the offset of the line on the chip.
    ///
    /// Names are looked up on the chip first.  Only if no line has the name is
    /// it parsed as a decimal offset.
    pub fn line_offset_from_id<I: Into<LineId>>(&self, id: I) -> Result<Offset> {
        line::resolve(self, &id.into())
    }

    /// Find the info for the named line.
    ///
    /// Returns the first matching line.
    pub fn find_line_info(&self, name: &str) -> Option<line::Info> {
        self.line_info_iter()
            .ok()
            .and_then(|iter| iter.filter_map(|x| x.ok()).find(|li| li.name == name))
    }

    /// Get the information for a line on the chip.
    pub fn line_info<I: Into<LineId>>(&self, id: I) -> Result<line::Info> {
        let f = self.file()?;
        let offset = self.line_offset_from_id(id)?;
        let li = v2::get_line_info(f, offset).map_err(|e| Error::Uapi(UapiCall::GetLineInfo, e))?;
        line::Info::try_from(&li)
    }

    /// An iterator that returns the info for each line on the chip.
    pub fn line_info_iter(&self) -> Result<LineInfoIterator<'_>> {
        let cinfo = self.info()?;
        Ok(LineInfoIterator {
            chip: self,
            offsets: Range {
                start: 0,
                end: cinfo.num_lines,
            },
        })
    }

    /// Add a watch for changes to the publicly available information on a line.
    ///
    /// Returns the current info for the line.
    ///
    /// Watching a line that is already watched is an error.
    pub fn watch_line_info<I: Into<LineId>>(&self, id: I) -> Result<line::Info> {
        let f = self.file()?;
        let offset = self.line_offset_from_id(id)?;
        let li =
            v2::watch_line_info(f, offset).map_err(|e| Error::Uapi(UapiCall::WatchLineInfo, e))?;
        line::Info::try_from(&li)
    }

    /// Remove a watch for changes to the publicly available information on a line.
    pub fn unwatch_line_info<I: Into<LineId>>(&self, id: I) -> Result<()> {
        let f = self.file()?;
        let offset = self.line_offset_from_id(id)?;
        v2::unwatch_line_info(f, offset).map_err(|e| Error::Uapi(UapiCall::UnwatchLineInfo, e))
    }

    /// Check if the chip has at least one info change event available to read.
    pub fn has_info_event(&self) -> Result<bool> {
        gpiocdev_uapi::has_event(self.file()?).map_err(|e| Error::Uapi(UapiCall::HasEvent, e))
    }

    /// Wait for an info change event to be available.
    ///
    /// A `timeout` of `None` waits indefinitely, and a zero `timeout` does not block.
    pub fn wait_info_event(&self, timeout: Option<Duration>) -> Result<bool> {
        crate::wait_readable(self.file()?, timeout)
    }

    /// Read a single line info change event from the chip.
    ///
    /// Will block until an event is available.
    pub fn read_info_event(&self) -> Result<InfoChangeEvent> {
        let mut buf = [0_u64; mem::size_of::<v2::LineInfoChangeEvent>() / 8];
        let n = gpiocdev_uapi::read_event(self.file()?, &mut buf)
            .map_err(|e| Error::Uapi(UapiCall::ReadEvent, e))?;
        info_change_event_from_slice(&buf[0..n])
    }

    /// An iterator for info change events from the chip.
    pub fn info_change_events(&self) -> Result<InfoChangeIterator<'_>> {
        self.file()?;
        Ok(InfoChangeIterator {
            chip: self,
            buf: vec![0_u64; mem::size_of::<v2::LineInfoChangeEvent>() / 8],
        })
    }

    /// Request a set of lines from the chip.
    ///
    /// The request does not depend on the chip remaining open.
    ///
    /// # Examples
    ///```no_run
    /// # fn example() -> gpiolines::Result<()>{
    /// use gpiolines::line::{EdgeDetection, Settings};
    /// use gpiolines::request::Config;
    ///
    /// let chip = gpiolines::Chip::from_name("gpiochip0")?;
    /// let mut cfg = Config::default();
    /// cfg.with_lines(["BUTTON", "DOOR"], Settings::default().with_edge_detection(EdgeDetection::Both));
    /// let req = chip.request_lines(&cfg)?;
    /// # Ok(())
    /// # }
    ///```
    pub fn request_lines(&self, cfg: &Config) -> Result<Request> {
        Request::new(self, cfg, ReconfigurePolicy::default(), 0)
    }
}

fn info_change_event_from_slice(d: &[u64]) -> Result<InfoChangeEvent> {
    InfoChangeEvent::try_from(
        v2::LineInfoChangeEvent::from_slice(d).map_err(|e| Error::Uapi(UapiCall::LICEFromBuf, e))?,
    )
}

impl LineLookup for Chip {
    fn num_lines(&self) -> Result<u32> {
        Ok(self.info()?.num_lines)
    }

    fn offset_of(&self, name: &str) -> Result<Offset> {
        for li in self.line_info_iter()? {
            let li = li?;
            if li.name == name {
                return Ok(li.offset);
            }
        }
        Err(Error::LineNotFound(name.to_owned()))
    }

    fn name_of(&self, offset: Offset) -> Result<String> {
        Ok(self.line_info(offset)?.name)
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = match &self.f {
            Some(file) => file,
            None => return write!(f, "<Chip CLOSED>"),
        };
        write!(
            f,
            "<Chip path=\"{}\" fd={}",
            self.path.display(),
            file.as_raw_fd()
        )?;
        match self.info() {
            Ok(info) => write!(f, " info={}>", info),
            Err(_) => write!(f, ">"),
        }
    }
}

/// The publicly available information for a GPIO chip.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Info {
    /// The system name for the chip, such as "*gpiochip0*".
    pub name: String,

    /// A functional name for the chip.
    ///
    /// This typically identifies the type of GPIO chip.
    pub label: String,

    /// The number of lines provided by the chip.
    pub num_lines: u32,
}

impl From<v2::ChipInfo> for Info {
    fn from(ci: v2::ChipInfo) -> Self {
        Info {
            name: String::from(&ci.name),
            label: String::from(&ci.label),
            num_lines: ci.num_lines,
        }
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<ChipInfo name=\"{}\" label=\"{}\" num_lines={}>",
            self.name, self.label, self.num_lines
        )
    }
}

/// An iterator for reading info change events from a [`Chip`].
///
/// Blocks until events are available.
pub struct InfoChangeIterator<'a> {
    chip: &'a Chip,

    /// The buffer for a single uAPI info change event.
    buf: Vec<u64>,
}

impl<'a> InfoChangeIterator<'a> {
    fn read_event(&mut self) -> Result<InfoChangeEvent> {
        let n = gpiocdev_uapi::read_event(self.chip.file()?, &mut self.buf)
            .map_err(|e| Error::Uapi(UapiCall::ReadEvent, e))?;
        info_change_event_from_slice(&self.buf[0..n])
    }
}

impl<'a> Iterator for InfoChangeIterator<'a> {
    type Item = Result<InfoChangeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.read_event())
    }
}

/// Reasons a file cannot be opened as a GPIO character device.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// No file exists at the path.
    NotFound,

    /// File is not a character device.
    NotCharacterDevice,

    /// File is not a GPIO character device.
    NotGpioDevice,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorKind::NotFound => "does not exist",
            ErrorKind::NotCharacterDevice => "is not a character device",
            ErrorKind::NotGpioDevice => "is not a GPIO character device",
        };
        write!(f, "{}", msg)
    }
}
