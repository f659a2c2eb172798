// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::chip::Chip;
use crate::line::{EdgeEvent, InfoChangeEvent};
use crate::request::{EdgeEventBuffer, Request};
use crate::Result;
use async_io::Async;
use futures::task::{Context, Poll};
use futures::{ready, Stream};
use std::os::fd::OwnedFd;
use std::pin::Pin;

/// Async wrapper around [`Chip`] for the async-io reactor.
///
/// The reactor places the chip file in non-blocking mode, so blocking reads
/// through [`AsyncChip::as_ref`] return an error rather than waiting.
///
/// # Example
///  ```no_run
/// # async fn docfn() -> gpiolines::Result<()> {
/// use gpiolines::async_io::AsyncChip;
///
/// let chip = gpiolines::Chip::from_name("gpiochip0")?;
/// chip.watch_line_info(3)?;
/// let achip = AsyncChip::new(chip)?;
/// let evt = achip.read_info_event().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AsyncChip {
    fd: Async<OwnedFd>,
    chip: Chip,
}

impl AsyncChip {
    /// Create an async-io wrapper for a Chip.
    pub fn new(chip: Chip) -> Result<Self> {
        let fd = Async::new(chip.fd()?.try_clone_to_owned()?)?;
        Ok(AsyncChip { fd, chip })
    }

    /// Async form of [`Chip::read_info_event`].
    pub async fn read_info_event(&self) -> Result<InfoChangeEvent> {
        loop {
            self.fd.readable().await?;
            if self.chip.has_info_event()? {
                return self.chip.read_info_event();
            }
        }
    }

    /// Async form of [`Chip::info_change_events`].
    ///
    /// # Example
    /// ```no_run
    /// # async fn docfn() -> gpiolines::Result<()> {
    /// use futures::StreamExt;
    /// use gpiolines::async_io::AsyncChip;
    ///
    /// let chip = gpiolines::Chip::from_name("gpiochip0")?;
    /// chip.watch_line_info("BUTTON")?;
    /// let achip = AsyncChip::new(chip)?;
    /// let mut events = achip.info_change_events();
    /// while let Some(evt) = events.next().await {
    ///     println!("{}", evt?);
    /// }
    /// # Ok(())
    /// # }
    /// ```
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

impl From<AsyncChip> for Chip {
    fn from(c: AsyncChip) -> Chip {
        c.chip
    }
}

/// Async form of [`InfoChangeIterator`].
///
/// Created by [`AsyncChip::info_change_events`].
///
/// [`InfoChangeIterator`]: crate::chip::InfoChangeIterator
pub struct InfoChangeStream<'a> {
    chip: &'a AsyncChip,
}

impl Stream for InfoChangeStream<'_> {
    type Item = Result<InfoChangeEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        loop {
            ready!(self.chip.fd.poll_readable(cx))?;
            if self.chip.chip.has_info_event()? {
                return Poll::Ready(Some(self.chip.chip.read_info_event()));
            }
        }
    }
}

/// Async wrapper around [`Request`] for the async-io reactor.
///
/// The reactor places the request file in non-blocking mode, so blocking reads
/// through [`AsyncRequest::as_ref`] return an error rather than waiting.
///
/// # Example
/// ```no_run
/// # async fn docfn() -> gpiolines::Result<()> {
/// use gpiolines::async_io::AsyncRequest;
/// use gpiolines::line::{EdgeDetection, Settings};
///
/// let req = gpiolines::Request::builder()
///     .on_chip("/dev/gpiochip0")
///     .with_line(42, Settings::default().with_edge_detection(EdgeDetection::Both))
///     .request()?;
/// let areq = AsyncRequest::new(req)?;
/// let evt = areq.read_edge_event().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AsyncRequest {
    fd: Async<OwnedFd>,
    req: Request,
}

impl AsyncRequest {
    /// Create an async-io wrapper for a Request.
    pub fn new(req: Request) -> Result<Self> {
        let fd = Async::new(req.fd()?.try_clone_to_owned()?)?;
        Ok(AsyncRequest { fd, req })
    }

    /// Async form of [`Request::read_edge_event`].
    pub async fn read_edge_event(&self) -> Result<EdgeEvent> {
        loop {
            self.fd.readable().await?;
            if self.req.has_edge_event()? {
                return self.req.read_edge_event();
            }
        }
    }

    /// Async form of [`Request::read_edge_events`].
    pub async fn read_edge_events(&self, max_events: Option<usize>) -> Result<Vec<EdgeEvent>> {
        loop {
            self.fd.readable().await?;
            if self.req.has_edge_event()? {
                return self.req.read_edge_events(max_events);
            }
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
    ///
    /// # Example
    /// ```no_run
    /// # async fn docfn() -> gpiolines::Result<()> {
    /// use futures::StreamExt;
    /// use gpiolines::async_io::AsyncRequest;
    /// use gpiolines::line::{EdgeDetection, Settings};
    ///
    /// let req = gpiolines::Request::builder()
    ///     .on_chip("/dev/gpiochip0")
    ///     .with_line(42, Settings::default().with_edge_detection(EdgeDetection::Both))
    ///     .request()?;
    /// let areq = AsyncRequest::new(req)?;
    /// let mut events = areq.edge_events()?;
    /// while let Some(evt) = events.next().await {
    ///     println!("{}", evt?);
    /// }
    /// # Ok(())
    /// # }
    /// ```
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

impl From<AsyncRequest> for Request {
    fn from(r: AsyncRequest) -> Request {
        r.req
    }
}

/// Async form of [`EdgeEventBuffer`] in its role as an iterator.
///
/// Created by [`AsyncRequest::new_edge_event_stream`] or [`AsyncRequest::edge_events`].
pub struct EdgeEventStream<'a> {
    req: &'a AsyncRequest,
    events: EdgeEventBuffer<'a>,
}

impl Stream for EdgeEventStream<'_> {
    type Item = Result<EdgeEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        loop {
            if self.events.has_event()? {
                return Poll::Ready(Some(self.events.read_event()));
            }
            ready!(self.req.fd.poll_readable(cx))?;
        }
    }
}
