// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Both wrappers own the wrapped Chip or Request and register a duplicate
// of its file descriptor with the reactor, so releasing or closing through
// the wrapper does not leave the reactor holding a dangling descriptor.

/// Wrappers around the Tokio reactor.
#[cfg(feature = "async_tokio")]
pub mod tokio;

/// Wrappers around the async-io reactor.
#[cfg(feature = "async_io")]
pub mod async_io;
