// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::chip::Chip;
use crate::line::{EdgeEvent, InfoChangeEvent};
use crate::request::{EdgeEventBuffer, Request};
use crate::Result;
use futures::ready;
use futures::task::{Context, Poll};
use std::os::fd::OwnedFd;
use std::pin::Pin;
use tokio::io::unix::AsyncFd;
use tokio_stream::Stream;

/// Async wrapper around [`Chip`] for the tokio reactor.
///
/// # Example
///  ```no_run
/// # async fn docfn() -> gpiolines::Result<()> {
/// use gpiolines::tokio::AsyncChip;
///
/// let chip = gpiolines::Chip::from_name("gpiochip0")?;
/// chip.watch_line_info("BUTTON")?;
/// let achip = AsyncChip::new(chip)?;
/// let evt = achip.read_info_event().await?;
/// # Ok(())
/// # }
/// ```
pub struct AsyncChip {
    fd: AsyncFd<OwnedFd>,
    chip: Chip,
}

impl AsyncChip {
    /// Create a Tokio wrapper for a Chip.
    ///
    /// Fails if the chip is closed or the reactor rejects the chip.
    pub fn new(chip: Chip) -> Result<Self> {
        let fd = AsyncFd::new(chip.fd()?.try_clone_to_owned()?)?;
        Ok(AsyncChip { fd, chip })
    }

    /// Async form of [`Chip::read_info_event`].
    pub async fn read_info_event(&self) -> Result<InfoChangeEvent> {
        loop {
            let mut guard = self.fd.readable().await?;
            if self.chip.has_info_event()? {
                let res = self.chip.read_info_event();
                if !self.chip.has_info_event()? {
                    guard.clear_ready();
                }
                return res;
            }
            guard.clear_ready();
        }
    }

    /// Async form of [`Chip::info_change_events`].
    pub fn info_change_events(&self) -> InfoChangeStream<'_> {
        InfoChangeStream { chip: self }
    }

    /// Unwrap the chip.
    pub fn into_inner(self) -> Chip {
        self.chip
    }
}

impl AsRef<Chip> for AsyncChip {
    fn as_ref(&self) -> &Chip {
        &self.chip
    }
}

/// Async form of [`InfoChangeIterator`].
///
/// [`InfoChangeIterator`]: crate::chip::InfoChangeIterator
pub struct InfoChangeStream<'a> {
    chip: &'a AsyncChip,
}

impl Stream for InfoChangeStream<'_> {
    type Item = Result<InfoChangeEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        let mut guard = ready!(self.chip.fd.poll_read_ready(cx))?;
        let chip = &self.chip.chip;
        let res = Poll::Ready(Some(chip.read_info_event()));
        if !chip.has_info_event()? {
            guard.clear_ready();
        }
        res
    }
}

/// Async wrapper around [`Request`] for the tokio reactor.
///
/// # Example
/// ```no_run
/// # async fn docfn() -> gpiolines::Result<()> {
/// use gpiolines::line::{EdgeDetection, Settings};
/// use gpiolines::tokio::AsyncRequest;
///
/// let req = gpiolines::Request::builder()
///     .on_chip("/dev/gpiochip0")
///     .with_line("BUTTON", Settings::default().with_edge_detection(EdgeDetection::Both))
///     .request()?;
/// let areq = AsyncRequest::new(req)?;
/// let evt = areq.read_edge_event().await?;
/// # Ok(())
/// # }
/// ```
pub struct AsyncRequest {
    fd: AsyncFd<OwnedFd>,
    req: Request,
}

impl AsyncRequest {
    /// Create a Tokio wrapper for a Request.
    ///
    /// Fails if the request is released or the reactor rejects the request.
    pub fn new(req: Request) -> Result<Self> {
        let fd = AsyncFd::new(req.fd()?.try_clone_to_owned()?)?;
        Ok(AsyncRequest { fd, req })
    }

    /// Async form of [`Request::read_edge_event`].
    pub async fn read_edge_event(&self) -> Result<EdgeEvent> {
        loop {
            let mut guard = self.fd.readable().await?;
            if self.req.has_edge_event()? {
                let res = self.req.read_edge_event();
                if !self.req.has_edge_event()? {
                    guard.clear_ready();
                }
                return res;
            }
            guard.clear_ready();
        }
    }

    /// Async form of [`Request::read_edge_events`].
    pub async fn read_edge_events(&self, max_events: Option<usize>) -> Result<Vec<EdgeEvent>> {
        loop {
            let mut guard = self.fd.readable().await?;
            if self.req.has_edge_event()? {
                let res = self.req.read_edge_events(max_events);
                if !self.req.has_edge_event()? {
                    guard.clear_ready();
                }
                return res;
            }
            guard.clear_ready();
        }
    }

    /// Async form of [`Request::new_edge_event_buffer`].
    ///
    /// * `capacity` - The number of events that can be buffered in user space.
    pub fn new_edge_event_stream(&self, capacity: usize) -> Result<EdgeEventStream<'_>> {
        Ok(EdgeEventStream {
            req: self,
            events: self.req.new_edge_event_buffer(capacity)?,
        })
    }

    /// Async form of [`Request::edge_events`].
    pub fn edge_events(&self) -> Result<EdgeEventStream<'_>> {
        Ok(EdgeEventStream {
            req: self,
            events: self.req.edge_events()?,
        })
    }

    /// Unwrap the request.
    pub fn into_inner(self) -> Request {
        self.req
    }
}

impl AsRef<Request> for AsyncRequest {
    fn as_ref(&self) -> &Request {
        &self.req
    }
}

/// Async form of [`EdgeEventBuffer`] in its role as an iterator.
pub struct EdgeEventStream<'a> {
    req: &'a AsyncRequest,
    events: EdgeEventBuffer<'a>,
}

impl Stream for EdgeEventStream<'_> {
    type Item = Result<EdgeEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        if !self.events.is_empty() {
            return Poll::Ready(Some(self.events.read_event()));
        }
        let mut guard = ready!(self.req.fd.poll_read_ready(cx))?;
        let res = Poll::Ready(Some(self.events.read_event()));
        if !self.events.has_event()? {
            guard.clear_ready();
        }
        res
    }
}
