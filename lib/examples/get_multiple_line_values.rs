// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of reading multiple lines.

use gpiolines::line::Settings;
use gpiolines::Request;
use std::result::Result;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // request multiple input lines
    let req = Request::builder()
        .on_chip("/dev/gpiochip0")
        .with_consumer("get-multiple-line-values")
        .with_lines([18, 23], Settings::default().as_input())
        .request()?;

    // get all requested line values at once, in request order
    let values = req.values()?;
    println!("all values = {values:?}");

    // or a subset
    let values = req.values_of([23])?;
    println!("one value = {values:?}");
    Ok(())
}
