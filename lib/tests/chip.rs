// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// ALL IT as can't construct a Chip without opening a GPIO file.

mod common;

use gpiolines::chip::{Chip, ErrorKind};
use gpiolines::line::{Bias, Direction, InfoChangeKind, Settings};
use gpiolines::request::Config;
use gpiolines::Error;
use gpiosim::{Bank, Simpleton};
use std::path::{Path, PathBuf};
use std::time::Duration;

// a collection of chips for testing chip existence
fn bag_of_chips() -> gpiosim::Sim {
    gpiosim::builder()
        .with_bank(&Bank::new(8, "veintidós"))
        .with_bank(&Bank::new(12, "babel"))
        .with_bank(&Bank::new(6, "woggle"))
        .live()
        .unwrap()
}

struct Symlink {
    src: PathBuf,
    dst: PathBuf,
}

impl Symlink {
    fn new<P: AsRef<Path>>(dst: P, src: P) -> Result<Symlink, std::io::Error> {
        std::os::unix::fs::symlink(&dst, &src)?;
        Ok(Symlink {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
        })
    }
}

impl Drop for Symlink {
    fn drop(&mut self) {
        _ = std::fs::remove_file(&self.src);
    }
}

#[test]
fn is_chip() {
    let cc = bag_of_chips();
    for c in cc.chips() {
        assert_eq!(gpiolines::is_chip(c.dev_path()).unwrap(), *c.dev_path());
    }
}

#[test]
fn is_chip_symlink() {
    let cc = bag_of_chips();
    let mut path = PathBuf::from("/tmp");
    path.push(gpiosim::unique_name("gpiolines_chip", None));
    let link = Symlink::new(cc.chips()[0].dev_path(), &path).unwrap();
    // locates and reports the path of the actual device
    assert_eq!(*gpiolines::is_chip(&link.src).unwrap(), *link.dst);
}

#[test]
fn is_chip_errors() {
    let path = PathBuf::from("/dev/gpiochip_nonexistent");
    assert!(matches!(
        gpiolines::is_chip(&path),
        Err(Error::GpioChip(p, ErrorKind::NotFound)) if p == path
    ));

    let path = PathBuf::from("/tmp");
    assert!(matches!(
        gpiolines::is_chip(&path),
        Err(Error::GpioChip(p, ErrorKind::NotCharacterDevice)) if p == path
    ));

    let path = PathBuf::from("/dev/null");
    assert!(matches!(
        gpiolines::is_chip(&path),
        Err(Error::GpioChip(p, ErrorKind::NotGpioDevice)) if p == path
    ));
}

#[test]
fn chips() {
    let cc = bag_of_chips();
    let system_chips = gpiolines::chip::chips().unwrap();
    for c in cc.chips() {
        // all chips in the test set must be in the system
        assert!(
            system_chips.contains(c.dev_path()),
            "{:?} not found in system chips",
            c.dev_path()
        );
    }
}

#[test]
fn from_path() {
    let s = bag_of_chips();
    for sc in s.chips() {
        let c = Chip::from_path(sc.dev_path()).unwrap();
        assert_eq!(c.path(), sc.dev_path());
        assert!(!c.is_closed());
    }

    let cc = bag_of_chips();
    let mut path = PathBuf::from("/tmp");
    path.push(gpiosim::unique_name("gpiolines_chip", None));
    let link = Symlink::new(cc.chips()[0].dev_path(), &path).unwrap();
    // constructs and reports the path of the actual device
    assert_eq!(Chip::from_path(&link.src).unwrap().path(), link.dst);

    let err = Chip::from_path("/dev/gpiochip_nonexistent").unwrap_err();
    assert_eq!(err.category(), gpiolines::ErrorCategory::NotFound);
    let err = Chip::from_path("/dev/null").unwrap_err();
    assert_eq!(err.category(), gpiolines::ErrorCategory::Device);
}

#[test]
fn from_name() {
    let s = bag_of_chips();
    for sc in s.chips() {
        let c = Chip::from_name(&sc.chip_name).unwrap();
        assert_eq!(c.path(), sc.dev_path());
    }
}

#[test]
fn info() {
    let s = bag_of_chips();
    for sc in s.chips() {
        let c = Chip::from_path(sc.dev_path()).unwrap();
        let info = c.info().unwrap();
        assert_eq!(info.num_lines, sc.config().num_lines);
        assert_eq!(info.label.as_str(), sc.config().label);
        assert_eq!(info.name.as_str(), sc.chip_name);
        // cached
        assert_eq!(c.info().unwrap(), info);
        assert_eq!(c.name().unwrap(), sc.chip_name);
    }
}

#[test]
fn close() {
    let s = Simpleton::new(4);
    let mut c = Chip::from_path(s.dev_path()).unwrap();
    assert!(c.fd().is_ok());
    assert!(c.close().is_ok());
    assert!(c.is_closed());

    assert!(matches!(c.close(), Err(Error::ChipClosed)));
    assert!(matches!(c.info(), Err(Error::ChipClosed)));
    assert!(matches!(c.fd(), Err(Error::ChipClosed)));
    assert!(matches!(c.line_info(1), Err(Error::ChipClosed)));
    assert!(matches!(c.watch_line_info(1), Err(Error::ChipClosed)));
    assert!(matches!(c.has_info_event(), Err(Error::ChipClosed)));
    assert!(matches!(
        c.request_lines(Config::default().with_line(1, None)),
        Err(Error::ChipClosed)
    ));
    assert_eq!(c.to_string(), "<Chip CLOSED>");
    // path remains available
    assert_eq!(c.path(), s.dev_path());
}

#[test]
fn display() {
    let s = Simpleton::new(4);
    let c = Chip::from_path(s.dev_path()).unwrap();
    let info = c.info().unwrap();
    let disp = c.to_string();
    assert!(disp.starts_with(&format!("<Chip path=\"{}\" fd=", s.dev_path().display())));
    assert!(disp.ends_with(&format!(
        "info=<ChipInfo name=\"{}\" label=\"{}\" num_lines=4>>",
        info.name, info.label
    )));
}

#[test]
fn line_offset_from_id() {
    let s = common::named_sim();
    let c = Chip::from_path(s.chips()[0].dev_path()).unwrap();

    assert_eq!(c.line_offset_from_id(6).unwrap(), 6);
    assert_eq!(c.line_offset_from_id("button").unwrap(), 3);
    // first match wins
    assert_eq!(c.line_offset_from_id("led").unwrap(), 1);
    // names take precedence over offsets
    assert_eq!(c.line_offset_from_id("2").unwrap(), 4);
    // numeric fallback
    assert_eq!(c.line_offset_from_id("7").unwrap(), 7);

    assert!(matches!(
        c.line_offset_from_id(8),
        Err(Error::InvalidOffset(8))
    ));
    assert!(matches!(
        c.line_offset_from_id("8"),
        Err(Error::LineNotFound(n)) if n == "8"
    ));
    assert!(matches!(
        c.line_offset_from_id("nonexistent"),
        Err(Error::LineNotFound(n)) if n == "nonexistent"
    ));
}

#[test]
fn line_info() {
    let s = common::named_sim();
    let sc = &s.chips()[0];
    let c = Chip::from_path(sc.dev_path()).unwrap();

    // names, offsets and used
    for (offset, name) in &sc.config().names {
        let info = c.line_info(*offset).unwrap();
        assert_eq!(info.name.as_str(), name);
        assert_eq!(info.offset, *offset);
        assert_eq!(info.used, sc.config().hogs.contains_key(offset));
    }

    // by name
    let info = c.line_info("button").unwrap();
    assert_eq!(info.offset, 3);
    assert_eq!(info.name, "button");
    assert!(!info.used);

    // hogs
    let info = c.line_info(2).unwrap();
    assert!(info.used);
    assert_eq!(info.consumer, "hogster");
    assert_eq!(info.direction, Direction::Output);

    assert!(matches!(c.line_info(8), Err(Error::InvalidOffset(8))));
    assert!(matches!(
        c.line_info("nonexistent"),
        Err(Error::LineNotFound(_))
    ));

    // reflects a request
    let req = c
        .request_lines(
            Config::default()
                .with_line(
                    "button",
                    Settings::default().as_input().with_bias(Bias::PullUp),
                )
                .with_consumer("line info"),
        )
        .unwrap();
    let info = c.line_info(3).unwrap();
    assert!(info.used);
    assert_eq!(info.consumer, "line info");
    assert_eq!(info.direction, Direction::Input);
    assert_eq!(info.bias, Bias::PullUp);
    assert!(!info.active_low);
    drop(req);
}

#[test]
fn line_info_iter() {
    let s = common::named_sim();
    let c = Chip::from_path(s.chips()[0].dev_path()).unwrap();
    let infos = c
        .line_info_iter()
        .unwrap()
        .collect::<gpiolines::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(infos.len(), 8);
    for (offset, info) in infos.iter().enumerate() {
        assert_eq!(info.offset as usize, offset);
    }
    assert_eq!(infos[3].name, "button");
}

#[test]
fn find_line_info() {
    let s = common::named_sim();
    let sc = &s.chips()[0];
    let c = Chip::from_path(sc.dev_path()).unwrap();

    let info = c.find_line_info("button").unwrap();
    assert_eq!(info.offset, 3);
    let info = c.find_line_info("led").unwrap();
    assert_eq!(info.offset, 1);
    assert!(c.find_line_info("not such line").is_none());
}

#[test]
fn watch_line_info() {
    let s = common::named_sim();
    let sc = &s.chips()[0];
    let c = Chip::from_path(sc.dev_path()).unwrap();

    assert!(matches!(c.watch_line_info(8), Err(Error::InvalidOffset(8))));

    let info = c.watch_line_info("button").unwrap();
    assert_eq!(info.offset, 3);
    assert!(!info.used);
    assert!(!c.has_info_event().unwrap());
    assert!(!c.wait_info_event(Some(common::EVENT_WAIT_TIMEOUT)).unwrap());

    // already watched
    assert!(matches!(
        c.watch_line_info(3),
        Err(Error::Uapi(gpiolines::UapiCall::WatchLineInfo, _))
    ));

    let mut req = gpiolines::Request::builder()
        .on_chip(sc.dev_path())
        .with_consumer("watcher")
        .with_line(3, Settings::default().as_input())
        .request()
        .unwrap();
    assert!(c.wait_info_event(Some(common::EVENT_WAIT_TIMEOUT)).unwrap());
    let evt = c.read_info_event().unwrap();
    assert_eq!(evt.kind, InfoChangeKind::Requested);
    assert_eq!(evt.info.offset, 3);
    assert_eq!(evt.info.consumer, "watcher");
    assert!(evt.info.used);

    req.reconfigure(
        Config::default().with_line(3, Settings::default().as_input().with_bias(Bias::PullDown)),
    )
    .unwrap();
    let evt = c.read_info_event().unwrap();
    assert_eq!(evt.kind, InfoChangeKind::Reconfigured);
    assert_eq!(evt.info.bias, Bias::PullDown);

    req.release().unwrap();
    let evt = c.read_info_event().unwrap();
    assert_eq!(evt.kind, InfoChangeKind::Released);
    assert!(!evt.info.used);
    assert!(!c.has_info_event().unwrap());
}

#[test]
fn unwatch_line_info() {
    let s = Simpleton::new(4);
    let c = Chip::from_path(s.dev_path()).unwrap();
    let offset = 3;

    // not watched
    assert!(matches!(
        c.unwatch_line_info(offset),
        Err(Error::Uapi(gpiolines::UapiCall::UnwatchLineInfo, _))
    ));

    assert!(c.watch_line_info(offset).is_ok());
    let req = gpiolines::Request::builder()
        .on_chip(s.dev_path())
        .with_line(offset, None)
        .request()
        .unwrap();
    assert!(c.has_info_event().unwrap());
    _ = c.read_info_event();
    drop(req);
    assert!(c.has_info_event().unwrap());
    _ = c.read_info_event();

    assert!(c.unwatch_line_info(offset).is_ok());
    let req = gpiolines::Request::builder()
        .on_chip(s.dev_path())
        .with_line(offset, None)
        .request()
        .unwrap();
    assert!(!c.has_info_event().unwrap());
    drop(req);
    assert!(!c.has_info_event().unwrap());
}

#[test]
fn info_change_events() {
    let s = Simpleton::new(4);
    let c = Chip::from_path(s.dev_path()).unwrap();
    c.watch_line_info(1).unwrap();
    c.watch_line_info(2).unwrap();

    let req = gpiolines::Request::builder()
        .on_chip(s.dev_path())
        .with_lines([2, 1], Settings::default().as_input())
        .request()
        .unwrap();
    drop(req);

    let kinds = c
        .info_change_events()
        .unwrap()
        .take(4)
        .map(|evt| {
            let evt = evt.unwrap();
            (evt.info.offset, evt.kind)
        })
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            (2, InfoChangeKind::Requested),
            (1, InfoChangeKind::Requested),
            (2, InfoChangeKind::Released),
            (1, InfoChangeKind::Released),
        ]
    );
}

#[test]
fn wait_info_event_zero_timeout() {
    let s = Simpleton::new(4);
    let c = Chip::from_path(s.dev_path()).unwrap();
    c.watch_line_info(0).unwrap();
    assert!(!c.wait_info_event(Some(Duration::ZERO)).unwrap());
}

#[test]
fn request_lines() {
    let s = common::named_sim();
    let mut c = Chip::from_path(s.chips()[0].dev_path()).unwrap();
    let mut cfg = Config::default();
    cfg.with_lines(["button", "led"], Settings::default().as_input())
        .with_consumer("from chip");
    let req = c.request_lines(&cfg).unwrap();
    assert_eq!(req.offsets().unwrap(), &[3, 1]);

    // request outlives the chip
    c.close().unwrap();
    assert_eq!(req.values().unwrap().len(), 2);
}
