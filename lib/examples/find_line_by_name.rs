// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of finding the chip and offset of the line with the given name.

fn main() -> gpiolines::Result<()> {
    let line_name = "GPIO22";
    for path in gpiolines::chip::chips()? {
        let chip = gpiolines::Chip::from_path(&path)?;
        match chip.line_offset_from_id(line_name) {
            Ok(offset) => {
                println!("{}: {} {}", line_name, chip.name()?, offset);
                return Ok(());
            }
            Err(gpiolines::Error::LineNotFound(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    println!("line {} not found", line_name);
    Ok(())
}
