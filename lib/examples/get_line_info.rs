// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of reading the info for a line, identified by name or offset.

fn main() -> gpiolines::Result<()> {
    // Example configuration
    let chip_path = "/dev/gpiochip0";
    let line = std::env::args().nth(1).unwrap_or_else(|| "12".into());

    let chip = gpiolines::Chip::from_path(chip_path)?;
    let info = chip.line_info(line)?;
    println!("{}", info);
    Ok(())
}
