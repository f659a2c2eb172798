// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Example of a bi-directional line requested as input and then switched to output.

use anyhow::Context;
use gpiolines::line::{Settings, Value};
use gpiolines::request::Config;
use gpiolines::Request;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let line = "GPIO5";
    let req = Request::builder()
        .on_chip("/dev/gpiochip0")
        .with_consumer("reconfigure-input-to-output")
        .with_line(line, Settings::default().as_input())
        .request()
        .context("Failed to request line")?;

    // read the current line value
    let value = req.value(line)?;
    println!("{line}={value} (input)");

    // switch the line to an output and drive it low
    let mut cfg = Config::default();
    cfg.with_line(line, Settings::default().as_output(Value::Inactive));
    for warning in req.reconfigure(&cfg)? {
        println!("{warning}");
    }

    // report the current driven value
    let value = req.value(line)?;
    println!("{line}={value} (output)");
    Ok(())
}
