// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of watching for info changes on particular lines.

use anyhow::Context;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let chip = gpiolines::Chip::from_path("/dev/gpiochip0")?;
    for line in ["GPIO22", "GPIO23", "24"] {
        let info = chip
            .watch_line_info(line)
            .with_context(|| format!("Failed to watch line {line}"))?;
        println!("{}", info);
    }
    for event in chip.info_change_events()? {
        println!("{}", event?);
    }
    Ok(())
}
