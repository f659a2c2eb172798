// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of watching for edge events on multiple lines.

use anyhow::Context;
use gpiolines::line::{EdgeDetection, LineId, Settings};
use gpiolines::Request;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let lines = [LineId::from(5), LineId::from(3), LineId::from("button")];

    // request the lines with edge detection to receive events
    let req = Request::builder()
        .on_chip("/dev/gpiochip0")
        .with_consumer("watch-multiple-line-values")
        .with_lines(lines, Settings::default().with_edge_detection(EdgeDetection::Both))
        .request()
        .context("Failed to request lines")?;

    // then wait for events...

    // using a blocking read in a loop
    let mut buf = req.new_edge_event_buffer(4)?;
    loop {
        let event = buf.read_event()?;
        println!("offset: {}, type: {}, event #{}", event.offset, event.kind, event.line_seqno);
    }
}
