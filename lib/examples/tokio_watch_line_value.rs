// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Example of asynchronously watching for edges on a single line using tokio.

use anyhow::Context;
use gpiolines::line::{EdgeDetection, Settings};
use gpiolines::tokio::AsyncRequest;
use gpiolines::Request;
use std::result::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let req = AsyncRequest::new(
        Request::builder()
            .on_chip("/dev/gpiochip0")
            .with_consumer("tokio-watch-line-value")
            .with_line(23, Settings::default().with_edge_detection(EdgeDetection::Both))
            .request()
            .context("Failed to request line")?,
    )?;
    loop {
        let event = req.read_edge_event().await?;
        println!("{} value={}", event, req.as_ref().value(23)?);
    }
}
