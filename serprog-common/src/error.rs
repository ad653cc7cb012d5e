// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host link failures.
//!
//! Protocol-level rejections never show up here: they are answered with NAK
//! on the wire. This type only reports that the byte stream itself stopped.

use embedded_io::ReadExactError;
use thiserror::Error;

#[derive(Debug, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The host closed the stream.
    #[error("host link closed")]
    Closed,

    /// The host link reported an I/O error.
    #[error("host link error: {0:?}")]
    Link(E),
}

impl<E> From<ReadExactError<E>> for Error<E> {
    fn from(err: ReadExactError<E>) -> Self {
        match err {
            ReadExactError::UnexpectedEof => Error::Closed,
            ReadExactError::Other(e) => Error::Link(e),
        }
    }
}

pub type Result<T, E> = core::result::Result<T, Error<E>>;
