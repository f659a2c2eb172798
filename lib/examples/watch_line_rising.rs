// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Example of watching for rising edges on a single line.

use anyhow::Context;
use gpiolines::line::{EdgeDetection, Settings};
use gpiolines::Request;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let req = Request::builder()
        .on_chip("/dev/gpiochip0")
        .with_consumer("watch-line-rising")
        .with_line(5, Settings::default().with_edge_detection(EdgeDetection::Rising))
        .request()
        .context("Failed to request line")?;

    // falling edges are not reported
    for event in req.edge_events()? {
        let event = event?;
        println!("offset: {}, type: {}, event #{}", event.offset, event.kind, event.seqno);
    }
    Ok(())
}
