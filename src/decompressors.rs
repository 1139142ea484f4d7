/*
===============================================================================

  CONTENTS:
    Integer decompressor

  PROGRAMMERS:

    martin.isenburg@rapidlasso.com  -  http://rapidlasso.com
    uday.karan@gmail.com - Hobu, Inc.

  COPYRIGHT:

    (c) 2007-2014, martin isenburg, rapidlasso - tools to catch reality
    (c) 2014, Uday Verma, Hobu, Inc.
    (c) 2019, Thomas Montaigu

    This is free software; you can redistribute and/or modify it under the
    terms of the GNU Lesser General Licence as published by the Free Software
    Foundation. See the COPYING file for more information.

  CHANGE HISTORY:
    6 June 2019: Translated to Rust

===============================================================================
*/

//! Signed-residual decoder built on top of [`crate::models`] and
//! [`crate::decoders::ArithmeticDecoder`].

use std::io::Read;

use crate::decoders::ArithmeticDecoder;
use crate::models::{ArithmeticBitModel, ArithmeticModel};

pub const DEFAULT_BITS: u32 = 16;
pub const DEFAULT_CONTEXTS: u32 = 1;
pub const DEFAULT_BITS_HIGH: u32 = 8;
pub const DEFAULT_RANGE: u32 = 0;

/// Decodes a stream of signed integers, each one as a magnitude class `k`
/// (decoded with a per-context [`ArithmeticModel`]) plus a corrector within
/// that class (decoded with a [`ArithmeticBitModel`] for `k == 0`, or one of
/// `corr_bits` further [`ArithmeticModel`]s otherwise).
#[derive(Clone)]
pub struct IntegerDecompressor {
    k: u32,

    contexts: u32,
    bits_high: u32,

    corr_bits: u32,
    corr_range: u32,
    corr_min: i32,

    m_bits: Vec<ArithmeticModel>,
    m_corrector_0: ArithmeticBitModel,
    m_corrector: Vec<ArithmeticModel>,
}

impl IntegerDecompressor {
    pub fn new(bits: u32, contexts: u32, bits_high: u32, range: u32) -> Self {
        let (corr_bits, corr_range, corr_min) = Self::derive_corrector_range(bits, range);

        Self {
            k: 0,
            contexts,
            bits_high,
            corr_bits,
            corr_range,
            corr_min,
            m_bits: Vec::new(),
            m_corrector_0: ArithmeticBitModel::new(),
            m_corrector: Vec::new(),
        }
    }

    fn derive_corrector_range(bits: u32, mut range: u32) -> (u32, u32, i32) {
        if range != 0 {
            let mut corr_bits = 0u32;
            let corr_range = range;
            while range != 0 {
                range >>= 1;
                corr_bits += 1;
            }
            if corr_range == 1u32 << (corr_bits - 1) {
                corr_bits -= 1;
            }
            let corr_min = -((corr_range / 2) as i32);
            (corr_bits, corr_range, corr_min)
        } else if bits != 0 && bits < 32 {
            let corr_range = 1u32 << bits;
            let corr_min = -((corr_range / 2) as i32);
            (bits, corr_range, corr_min)
        } else {
            (32, 0, -(std::i32::MAX))
        }
    }

    /// Current magnitude class from the last `decompress` call. Callers
    /// (the point10 decompressor) use this as context for later fields.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Allocates and equiprobably initializes every sub-model. Idempotent:
    /// calling it again after models already exist is a no-op, matching the
    /// guarantee that re-initializing for a new chunk never duplicates state.
    pub fn init(&mut self) {
        if self.m_bits.is_empty() {
            for _ in 0..self.contexts {
                self.m_bits.push(ArithmeticModel::new(self.corr_bits + 1, &[]));
            }
            for i in 1..self.corr_bits {
                let size = if i <= self.bits_high {
                    1 << i
                } else {
                    1 << self.bits_high
                };
                self.m_corrector.push(ArithmeticModel::new(size, &[]));
            }
        }
    }

    /// Decompresses one signed integer given the predictor `pred` and the
    /// per-context model index `context`.
    pub fn decompress<R: Read>(
        &mut self,
        dec: &mut ArithmeticDecoder<R>,
        pred: i32,
        context: u32,
    ) -> std::io::Result<i32> {
        self.k = dec.decode_symbol(&mut self.m_bits[context as usize])?;

        let corr: i32 = if self.k == 0 {
            dec.decode_bit(&mut self.m_corrector_0)? as i32
        } else if self.k < 32 {
            let mut c: i32 = if self.k <= self.bits_high {
                dec.decode_symbol(&mut self.m_corrector[(self.k - 1) as usize])? as i32
            } else {
                let k1 = self.k - self.bits_high;
                let high = dec.decode_symbol(&mut self.m_corrector[(self.k - 1) as usize])? as i32;
                let low = dec.read_bits(k1)? as i32;
                (high << k1) | low
            };

            if c >= (1u32 << (self.k - 1)) as i32 {
                c += 1;
            } else {
                c -= ((1u32 << self.k) - 1) as i32;
            }
            c
        } else {
            self.corr_min
        };

        let mut real = pred.wrapping_add(corr);
        if self.corr_range != 0 {
            if real < 0 {
                real += self.corr_range as i32;
            } else if real >= self.corr_range as i32 {
                real -= self.corr_range as i32;
            }
        }
        Ok(real)
    }
}

pub struct IntegerDecompressorBuilder {
    bits: u32,
    contexts: u32,
    bits_high: u32,
    range: u32,
}

impl IntegerDecompressorBuilder {
    pub fn new() -> Self {
        Self {
            bits: DEFAULT_BITS,
            contexts: DEFAULT_CONTEXTS,
            bits_high: DEFAULT_BITS_HIGH,
            range: DEFAULT_RANGE,
        }
    }

    pub fn bits(&mut self, bits: u32) -> &mut Self {
        self.bits = bits;
        self
    }

    pub fn contexts(&mut self, contexts: u32) -> &mut Self {
        self.contexts = contexts;
        self
    }

    pub fn bits_high(&mut self, bits_high: u32) -> &mut Self {
        self.bits_high = bits_high;
        self
    }

    pub fn range(&mut self, range: u32) -> &mut Self {
        self.range = range;
        self
    }

    pub fn build(&self) -> IntegerDecompressor {
        IntegerDecompressor::new(self.bits, self.contexts, self.bits_high, self.range)
    }

    pub fn build_initialized(&self) -> IntegerDecompressor {
        let mut idc = self.build();
        idc.init();
        idc
    }
}

impl Default for IntegerDecompressorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn init_is_idempotent() {
        let mut idc = IntegerDecompressorBuilder::new().bits(16).contexts(4).build();
        idc.init();
        let bits_count = idc.m_bits.len();
        let corrector_count = idc.m_corrector.len();
        idc.init();
        assert_eq!(idc.m_bits.len(), bits_count);
        assert_eq!(idc.m_corrector.len(), corrector_count);
    }

    #[test]
    fn all_zero_stream_decompresses_to_the_predictor() {
        // scenario: bits=16, contexts=1, a stream that encodes k=0 then bit 0
        // returns pred + 0. An all-zero stream always takes the k=0 / bit=0
        // path (see ArithmeticDecoder tests for why).
        let mut idc = IntegerDecompressorBuilder::new().bits(16).contexts(1).build_initialized();
        let mut dec = ArithmeticDecoder::new(Cursor::new(vec![0u8; 32]));
        dec.read_init_bytes().unwrap();

        let real = idc.decompress(&mut dec, 42, 0).unwrap();
        assert_eq!(real, 42);
        assert_eq!(idc.k(), 0);
    }

    #[test]
    fn corrector_range_derived_from_bits() {
        let idc = IntegerDecompressorBuilder::new().bits(8).build();
        assert_eq!(idc.corr_bits, 8);
        assert_eq!(idc.corr_range, 256);
        assert_eq!(idc.corr_min, -128);
    }

    #[test]
    fn corrector_range_derived_from_explicit_range() {
        let idc = IntegerDecompressorBuilder::new().bits(0).range(1000).build();
        // ceil(log2(1000)) == 10
        assert_eq!(idc.corr_bits, 10);
        assert_eq!(idc.corr_range, 1000);
    }

    #[test]
    fn corrector_range_snaps_down_on_exact_power_of_two() {
        let idc = IntegerDecompressorBuilder::new().bits(0).range(1024).build();
        // 1024 == 2^10, so corr_bits is decremented from 11 to 10.
        assert_eq!(idc.corr_bits, 10);
        assert_eq!(idc.corr_range, 1024);
    }

    #[test]
    fn unbounded_range_uses_the_symmetric_corr_min() {
        // bits=32, range=0 is how ic_dx/ic_dy/ic_z are built; corr_min must be
        // -0x7FFF_FFFF, not i32::MIN, to match the escape contract.
        let idc = IntegerDecompressorBuilder::new().bits(32).build();
        assert_eq!(idc.corr_bits, 32);
        assert_eq!(idc.corr_range, 0);
        assert_eq!(idc.corr_min, -0x7FFF_FFFF);
    }

    #[test]
    fn corrector_model_count_matches_the_half_open_range() {
        // m_corrector must hold exactly corr_bits - 1 symbol models, one per
        // k in [1, corr_bits).
        let mut idc = IntegerDecompressorBuilder::new().bits(16).build();
        idc.init();
        assert_eq!(idc.m_corrector.len(), 15);
    }
}
