/*
===============================================================================

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

    This software is distributed WITHOUT ANY WARRANTY and without even the
    implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.

  CHANGE HISTORY:
    6 June 2019: Translated to Rust
===============================================================================
*/

use std::io::Read;
use std::mem::size_of;

use crate::decoders::ArithmeticDecoder;
use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
use crate::las::utils;
use crate::models::ArithmeticModel;
use crate::packers::Packable;

const POINT10_SIZE: usize = 20;

struct Point10ChangedValues {
    value: u32,
}

impl Point10ChangedValues {
    fn bit_fields_changed(&self) -> bool {
        (self.value & (1 << 5)) != 0
    }

    fn intensity_changed(&self) -> bool {
        (self.value & (1 << 4)) != 0
    }

    fn classification_changed(&self) -> bool {
        (self.value & (1 << 3)) != 0
    }

    fn scan_angle_rank_changed(&self) -> bool {
        (self.value & (1 << 2)) != 0
    }

    fn user_data_changed(&self) -> bool {
        (self.value & (1 << 1)) != 0
    }

    fn point_source_id_changed(&self) -> bool {
        (self.value & 1) != 0
    }
}

/// A decoded point10 LAS record (x, y, z plus the point10 attribute set).
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub struct Point10 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub intensity: u16,

    // 3 bits
    pub number_of_returns_of_given_pulse: u8,
    // 1 bit
    pub scan_direction_flag: bool,
    // 1 bit
    pub edge_of_flight_line: bool,
    // 3 bits
    pub return_number: u8,

    // 5 bits for classification, the rest are bit flags
    pub classification: u8,

    pub scan_angle_rank: i8,
    pub user_data: u8,
    pub point_source_id: u16,
}

impl Point10 {
    pub fn populate_bit_fields_from(&mut self, byte: u8) {
        self.return_number = byte & 0x7;
        self.number_of_returns_of_given_pulse = (byte >> 3) & 0x7;
        self.scan_direction_flag = ((byte >> 6) & 0x1) != 0;
        self.edge_of_flight_line = ((byte >> 7) & 0x1) != 0;
    }

    pub fn bit_fields_to_byte(&self) -> u8 {
        let a = self.return_number;
        let b = self.number_of_returns_of_given_pulse;
        let c = self.scan_direction_flag as u8;
        let d = self.edge_of_flight_line as u8;

        ((d & 0x1) << 7) | (c & 0x1) << 6 | (b & 0x7) << 3 | (a & 0x7)
    }

    fn changed_values(&self, last: &Self, last_intensity: u16) -> Point10ChangedValues {
        // a 6-bit changed map of what differs from the last point, not
        // considering x, y and z
        let bit_fields_changed = ((last.return_number ^ self.return_number) != 0)
            | ((last.number_of_returns_of_given_pulse ^ self.number_of_returns_of_given_pulse)
                != 0)
            | (last.scan_direction_flag ^ self.scan_direction_flag)
            | (last.edge_of_flight_line ^ self.edge_of_flight_line);

        let intensity_changed = (last_intensity ^ self.intensity) != 0;
        let classification_changed = (last.classification ^ self.classification) != 0;
        let scan_angle_rank_changed = (last.scan_angle_rank ^ self.scan_angle_rank) != 0;
        let user_data_changed = (last.user_data ^ self.user_data) != 0;
        let point_source_id_changed = (last.point_source_id ^ self.point_source_id) != 0;

        Point10ChangedValues {
            value: (bit_fields_changed as u32) << 5
                | (intensity_changed as u32) << 4
                | (classification_changed as u32) << 3
                | (scan_angle_rank_changed as u32) << 2
                | (user_data_changed as u32) << 1
                | (point_source_id_changed as u32),
        }
    }
}

impl Packable for Point10 {
    fn unpack_from(input: &[u8]) -> Self {
        let mut point = Point10::default();

        let mut start = 0;
        let mut end = size_of::<i32>();
        point.x = i32::unpack_from(&input[start..end]);
        start += size_of::<i32>();
        end += size_of::<i32>();
        point.y = i32::unpack_from(&input[start..end]);
        start += size_of::<i32>();
        end += size_of::<i32>();
        point.z = i32::unpack_from(&input[start..end]);

        start = end;
        end += size_of::<u16>();
        point.intensity = u16::unpack_from(&input[start..end]);

        start = end;
        end += size_of::<u8>();
        let bitfields = u8::unpack_from(&input[start..end]);
        point.populate_bit_fields_from(bitfields);

        start = end;
        end += size_of::<u8>();
        point.classification = u8::unpack_from(&input[start..end]);

        start = end;
        end += size_of::<i8>();
        point.scan_angle_rank = i8::unpack_from(&input[start..end]);

        start = end;
        end += size_of::<u8>();
        point.user_data = u8::unpack_from(&input[start..end]);

        start = end;
        end += size_of::<u16>();
        point.point_source_id = u16::unpack_from(&input[start..end]);

        point
    }

    fn pack_into(&self, output: &mut [u8]) {
        let mut start = 0;
        let mut end = size_of::<i32>();

        self.x.pack_into(&mut output[start..end]);
        start += size_of::<i32>();
        end += size_of::<i32>();
        self.y.pack_into(&mut output[start..end]);
        start += size_of::<i32>();
        end += size_of::<i32>();
        self.z.pack_into(&mut output[start..end]);

        start = end;
        end += size_of::<u16>();
        self.intensity.pack_into(&mut output[start..end]);

        start = end;
        end += size_of::<u8>();
        self.bit_fields_to_byte().pack_into(&mut output[start..end]);

        start = end;
        end += size_of::<u8>();
        self.classification.pack_into(&mut output[start..end]);

        start = end;
        end += size_of::<i8>();
        self.scan_angle_rank.pack_into(&mut output[start..end]);

        start = end;
        end += size_of::<u8>();
        self.user_data.pack_into(&mut output[start..end]);

        start = end;
        end += size_of::<u16>();
        self.point_source_id.pack_into(&mut output[start..end]);
    }

    unsafe fn unpack_from_unchecked(input: &[u8]) -> Self {
        Self::unpack_from(input)
    }

    unsafe fn pack_into_unchecked(&self, output: &mut [u8]) {
        self.pack_into(output)
    }
}

#[inline]
fn lazy_model(slot: &mut Option<ArithmeticModel>) -> &mut ArithmeticModel {
    slot.get_or_insert_with(|| ArithmeticModel::new(256, &[]))
}

/// Decodes successive point10 records out of an [`ArithmeticDecoder`],
/// starting from a seed record supplied out of band.
///
/// Every model it owns is private to this decompressor: there is no sharing
/// across instances, and a single instance must not be used with more than
/// one decoder at a time (the models and the decoder advance in lockstep).
pub struct Point10Decompressor {
    ic_intensity: IntegerDecompressor,
    ic_point_source_id: IntegerDecompressor,
    ic_dx: IntegerDecompressor,
    ic_dy: IntegerDecompressor,
    ic_z: IntegerDecompressor,

    changed_values: ArithmeticModel,
    scan_angle_rank: Vec<ArithmeticModel>,
    bit_byte: Vec<Option<ArithmeticModel>>,
    classification: Vec<Option<ArithmeticModel>>,
    user_data: Vec<Option<ArithmeticModel>>,

    last_point: Point10,
    last_intensity: [u16; 16],
    last_x_diff_median: Vec<utils::StreamingMedian>,
    last_y_diff_median: Vec<utils::StreamingMedian>,
    last_height: [i32; 8],

    decompressor_inited: bool,
}

impl Point10Decompressor {
    pub fn new() -> Self {
        Self {
            ic_intensity: IntegerDecompressorBuilder::new()
                .bits(16)
                .contexts(4)
                .build(),
            ic_point_source_id: IntegerDecompressorBuilder::new().bits(16).build(),
            ic_dx: IntegerDecompressorBuilder::new().bits(32).contexts(2).build(),
            ic_dy: IntegerDecompressorBuilder::new()
                .bits(32)
                .contexts(22)
                .build(),
            ic_z: IntegerDecompressorBuilder::new()
                .bits(32)
                .contexts(20)
                .build(),
            changed_values: ArithmeticModel::new(64, &[]),
            scan_angle_rank: (0..2).map(|_| ArithmeticModel::new(256, &[])).collect(),
            bit_byte: (0..256).map(|_| None).collect(),
            classification: (0..256).map(|_| None).collect(),
            user_data: (0..256).map(|_| None).collect(),
            last_point: Point10::default(),
            last_intensity: [0u16; 16],
            last_x_diff_median: (0..16).map(|_| utils::StreamingMedian::new()).collect(),
            last_y_diff_median: (0..16).map(|_| utils::StreamingMedian::new()).collect(),
            last_height: [0i32; 8],
            decompressor_inited: false,
        }
    }

    fn init_integer_decompressors(&mut self) {
        if !self.decompressor_inited {
            self.ic_intensity.init();
            self.ic_point_source_id.init();
            self.ic_dx.init();
            self.ic_dy.init();
            self.ic_z.init();
            self.decompressor_inited = true;
        }
    }

    /// Seeds the decompressor from the 20 uncompressed bytes of the first
    /// point of a chunk, then primes `decoder` by reading its init bytes.
    /// Must be called exactly once, before any call to `read`.
    pub fn read_first<R: Read>(
        &mut self,
        decoder: &mut ArithmeticDecoder<R>,
        seed: &[u8],
    ) -> std::io::Result<Point10> {
        assert_eq!(
            seed.len(),
            POINT10_SIZE,
            "point10 seed record must be {} bytes",
            POINT10_SIZE
        );
        self.init_integer_decompressors();

        self.last_point = Point10::unpack_from(seed);
        decoder.read_init_bytes()?;
        Ok(self.last_point)
    }

    /// Decodes the next point10 record following the one last returned by
    /// `read_first`/`read`.
    pub fn read<R: Read>(&mut self, decoder: &mut ArithmeticDecoder<R>) -> std::io::Result<Point10> {
        let changed_value = Point10ChangedValues {
            value: decoder.decode_symbol(&mut self.changed_values)?,
        };

        let r;
        let n;
        let m;
        let l;

        if changed_value.value != 0 {
            if changed_value.bit_fields_changed() {
                let last_b = self.last_point.bit_fields_to_byte();
                let b = decoder.decode_symbol(lazy_model(&mut self.bit_byte[last_b as usize]))?;
                self.last_point.populate_bit_fields_from(b as u8);
            }

            r = self.last_point.return_number;
            n = self.last_point.number_of_returns_of_given_pulse;
            m = utils::NUMBER_RETURN_MAP[n as usize][r as usize];
            l = utils::NUMBER_RETURN_LEVEL[n as usize][r as usize];

            if changed_value.intensity_changed() {
                self.last_point.intensity = self.ic_intensity.decompress(
                    decoder,
                    self.last_intensity[m as usize] as i32,
                    if m < 3 { m as u32 } else { 3 },
                )? as u16;
                self.last_intensity[m as usize] = self.last_point.intensity;
            } else {
                self.last_point.intensity = self.last_intensity[m as usize];
            }

            if changed_value.classification_changed() {
                let last_c = self.last_point.classification;
                self.last_point.classification =
                    decoder.decode_symbol(lazy_model(&mut self.classification[last_c as usize]))? as u8;
            }

            if changed_value.scan_angle_rank_changed() {
                let val = decoder.decode_symbol(
                    &mut self.scan_angle_rank[self.last_point.scan_direction_flag as usize],
                )? as u8;
                self.last_point.scan_angle_rank =
                    val.wrapping_add(self.last_point.scan_angle_rank as u8) as i8;
            }

            if changed_value.user_data_changed() {
                let last_u = self.last_point.user_data;
                self.last_point.user_data =
                    decoder.decode_symbol(lazy_model(&mut self.user_data[last_u as usize]))? as u8;
            }

            if changed_value.point_source_id_changed() {
                self.last_point.point_source_id = self.ic_point_source_id.decompress(
                    decoder,
                    self.last_point.point_source_id as i32,
                    0,
                )? as u16;
            }
        } else {
            r = self.last_point.return_number;
            n = self.last_point.number_of_returns_of_given_pulse;
            m = utils::NUMBER_RETURN_MAP[n as usize][r as usize];
            l = utils::NUMBER_RETURN_LEVEL[n as usize][r as usize];
        }

        let median = self.last_x_diff_median[m as usize].get();
        let diff = self.ic_dx.decompress(decoder, median, (n == 1) as u32)?;
        self.last_point.x += diff;
        self.last_x_diff_median[m as usize].add(diff);

        let median = self.last_y_diff_median[m as usize].get();
        let k_bits = self.ic_dx.k();
        let context = (n == 1) as u32
            + if k_bits < 20 {
                utils::u32_zero_bit(k_bits)
            } else {
                20
            };
        let diff = self.ic_dy.decompress(decoder, median, context)?;
        self.last_point.y += diff;
        self.last_y_diff_median[m as usize].add(diff);

        let k_bits = (self.ic_dx.k() + self.ic_dy.k()) / 2;
        let context = (n == 1) as u32
            + if k_bits < 18 {
                utils::u32_zero_bit(k_bits)
            } else {
                18
            };
        self.last_point.z = self.ic_z.decompress(decoder, self.last_height[l as usize], context)?;
        self.last_height[l as usize] = self.last_point.z;

        Ok(self.last_point)
    }
}

impl Default for Point10Decompressor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decoder_of(bytes: Vec<u8>) -> ArithmeticDecoder<Cursor<Vec<u8>>> {
        ArithmeticDecoder::new(Cursor::new(bytes))
    }

    #[test]
    fn read_first_unpacks_the_seed_record() {
        let mut seed = [0u8; POINT10_SIZE];
        let point = Point10 {
            x: 10,
            y: -20,
            z: 30,
            intensity: 500,
            number_of_returns_of_given_pulse: 2,
            scan_direction_flag: true,
            edge_of_flight_line: false,
            return_number: 1,
            classification: 2,
            scan_angle_rank: -5,
            user_data: 7,
            point_source_id: 42,
        };
        point.pack_into(&mut seed);

        let mut decompressor = Point10Decompressor::new();
        let mut decoder = decoder_of(vec![0u8; 4]);
        let decoded = decompressor.read_first(&mut decoder, &seed).unwrap();
        assert_eq!(decoded, point);
    }

    #[test]
    #[should_panic(expected = "point10 seed record must be")]
    fn read_first_rejects_wrong_length_seed() {
        let mut decompressor = Point10Decompressor::new();
        let mut decoder = decoder_of(vec![0u8; 4]);
        decompressor.read_first(&mut decoder, &[0u8; 10]).unwrap();
    }

    #[test]
    fn all_zero_body_repeats_the_seed_unchanged() {
        // an all-zero compressed body always decodes "nothing changed" plus
        // zero deltas everywhere, so the decoded record equals the seed.
        let seed = [0u8; POINT10_SIZE];
        let mut decompressor = Point10Decompressor::new();
        let mut decoder = decoder_of(vec![0u8; 256]);

        let first = decompressor.read_first(&mut decoder, &seed).unwrap();
        let second = decompressor.read(&mut decoder).unwrap();
        assert_eq!(first, second);
        assert_eq!(second, Point10::default());
    }

    #[test]
    fn all_zero_body_is_stable_across_many_reads() {
        let seed = [0u8; POINT10_SIZE];
        let mut decompressor = Point10Decompressor::new();
        let mut decoder = decoder_of(vec![0u8; 4096]);

        decompressor.read_first(&mut decoder, &seed).unwrap();
        for _ in 0..32 {
            let point = decompressor.read(&mut decoder).unwrap();
            assert_eq!(point, Point10::default());
        }
    }
}
