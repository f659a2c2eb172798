// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of reading a single line.

use gpiolines::line::{Bias, Settings};
use gpiolines::Request;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let line = "GPIO22";
    // request the line as an input
    let req = Request::builder()
        .on_chip("/dev/gpiochip0")
        .with_consumer("get-line-value")
        .with_line(
            line,
            // optionally set a pull-up or other attribute
            Settings::default().as_input().with_bias(Bias::PullUp),
        )
        .request()?;

    let value = req.value(line)?;
    println!("{line}={value}");

    Ok(())
}
