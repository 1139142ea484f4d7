//! Bit-exact arithmetic (range) decoder and point10 record decompressor
//! for the LAZ point-cloud compression format.
//!
//! This crate implements the decode-only core that a LAZ/LAS reader needs to
//! turn a compressed point10 byte stream back into point records: the
//! adaptive [`models::ArithmeticBitModel`] and [`models::ArithmeticModel`]
//! probability estimators, the [`decoders::ArithmeticDecoder`] interval
//! arithmetic decoder built on top of them, the [`decompressors::IntegerDecompressor`]
//! signed-residual decoder, and [`las::point10::Point10Decompressor`], which
//! assembles all of the above into the point10 record state machine.
//!
//! The outer LAZ/LAS container (VLR parsing, chunk tables, other point record
//! formats, the matching encoder) is out of scope here; this crate only
//! consumes a byte source exposing [`std::io::Read`] and produces decoded
//! point10 records from it.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use laz10::decoders::ArithmeticDecoder;
//! use laz10::las::point10::Point10Decompressor;
//!
//! // A seed record followed by an all-zero compressed body decodes to
//! // repeated copies of the seed (see `Point10Decompressor::read` for why).
//! let seed = [0u8; 20];
//! let body = vec![0u8; 64];
//!
//! let mut decompressor = Point10Decompressor::new();
//! let mut decoder = ArithmeticDecoder::new(Cursor::new(body));
//!
//! let first = decompressor.read_first(&mut decoder, &seed).unwrap();
//! let second = decompressor.read(&mut decoder).unwrap();
//! assert_eq!(first, second);
//! ```

pub mod decoders;
pub mod decompressors;
pub mod las;
pub mod models;
pub mod packers;
