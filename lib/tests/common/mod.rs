// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(dead_code)]

use std::time::Duration;

// max time to allow events to propagate from the sim to cdev
const PROPAGATION_DELAY: Duration = Duration::from_millis(10);

// max time to wait for an event - expected or not
pub const EVENT_WAIT_TIMEOUT: Duration = Duration::from_millis(25);

pub fn wait_propagation_delay() {
    std::thread::sleep(PROPAGATION_DELAY);
}

// a single chip with named and hogged lines
//
// 0: ""  1: "led"  2: "" (hogged)  3: "button"  4: "2"  5: "led"  6: ""  7: ""
pub fn named_sim() -> gpiosim::Sim {
    gpiosim::builder()
        .with_bank(
            gpiosim::Bank::new(8, "named")
                .name(1, "led")
                .name(3, "button")
                .name(4, "2")
                .name(5, "led")
                .hog(2, "hogster", gpiosim::Direction::OutputLow),
        )
        .live()
        .unwrap()
}
