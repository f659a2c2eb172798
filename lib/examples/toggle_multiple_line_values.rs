// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of toggling multiple lines.

use anyhow::Context;
use gpiolines::line::{LineId, Settings, Value};
use gpiolines::Request;
use std::result::Result;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut values = vec![(LineId::from(22), Value::Active), (LineId::from(12), Value::Inactive)];

    let req = Request::builder()
        .on_chip("/dev/gpiochip0")
        .with_consumer("toggle-multiple-line-values")
        .with_lines([22, 12], Settings::default().as_output(Value::Inactive))
        .with_output_value(22, Value::Active)
        .request()
        .context("Failed to request lines")?;

    loop {
        println!("{values:?}");
        thread::sleep(Duration::from_millis(500));
        for (_, value) in values.iter_mut() {
            *value = value.not();
        }
        req.set_values(values.iter().cloned())
            .context("Failed to set values")?;
    }
}
