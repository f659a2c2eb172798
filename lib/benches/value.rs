// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{criterion_group, criterion_main, Bencher, Criterion};

use gpiolines::line::{LineId, Offset, Settings, Value};
use gpiolines::request::Request;
use gpiosim::{Bank, Simpleton};

criterion_group!(benches, benchmarks);
criterion_main!(benches);

fn benchmarks(c: &mut Criterion) {
    c.bench_function("get one", get_one);
    c.bench_function("get one by name", get_one_by_name);
    c.bench_function("get ten", get_ten);
    c.bench_function("get maxlen", get_maxlen);
    c.bench_function("set one", set_one);
    c.bench_function("set ten", set_ten);
}

// determine time taken to get one line
fn get_one(b: &mut Bencher) {
    let s = Simpleton::new(10);
    let offset = 1;
    let req = Request::builder()
        .on_chip(s.dev_path())
        .with_line(offset, Settings::default().as_input())
        .request()
        .unwrap();

    b.iter(|| {
        req.value(offset).unwrap();
    });
}

// determine the overhead of mapping a name to a requested line
fn get_one_by_name(b: &mut Bencher) {
    let sim = gpiosim::builder()
        .with_bank(Bank::new(10, "bench").name(1, "button"))
        .live()
        .unwrap();
    let req = Request::builder()
        .on_chip(sim.chips()[0].dev_path())
        .with_line("button", Settings::default().as_input())
        .request()
        .unwrap();

    b.iter(|| {
        req.value("button").unwrap();
    });
}

// determine time taken to get ten lines
fn get_ten(b: &mut Bencher) {
    let s = Simpleton::new(10);
    let req = Request::builder()
        .on_chip(s.dev_path())
        .with_lines(0..10, Settings::default().as_input())
        .request()
        .unwrap();

    b.iter(|| {
        req.values().unwrap();
    });
}

// determine time taken to get the maximum number of lines in a request
fn get_maxlen(b: &mut Bencher) {
    let s = Simpleton::new(64);
    let offsets: Vec<Offset> = (0..64).collect();
    let req = Request::builder()
        .on_chip(s.dev_path())
        .with_lines(offsets, Settings::default().as_input())
        .request()
        .unwrap();

    b.iter(|| {
        req.values().unwrap();
    });
}

// determine time taken to set one line
fn set_one(b: &mut Bencher) {
    let s = Simpleton::new(10);
    let offset = 1;
    let req = Request::builder()
        .on_chip(s.dev_path())
        .with_line(offset, Settings::default().as_output(Value::Active))
        .request()
        .unwrap();

    b.iter(|| {
        req.set_value(offset, Value::Active).unwrap();
    });
}

// determine time taken to set multiple lines
fn set_ten(b: &mut Bencher) {
    let s = Simpleton::new(10);
    let req = Request::builder()
        .on_chip(s.dev_path())
        .with_lines(0..10, Settings::default().as_output(Value::Active))
        .request()
        .unwrap();
    let values: Vec<(LineId, Value)> = (0..10)
        .map(|offset: Offset| (LineId::from(offset), Value::Inactive))
        .collect();

    b.iter(|| {
        req.set_values(values.iter().cloned()).unwrap();
    });
}
