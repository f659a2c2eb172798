// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of reading the info for each chip on the system.

fn main() -> gpiolines::Result<()> {
    for path in gpiolines::chip::chips()? {
        let chip = gpiolines::Chip::from_path(&path)?;
        let info = chip.info()?;
        println!("{} [{}] ({} lines)", info.name, info.label, info.num_lines);
    }
    Ok(())
}
