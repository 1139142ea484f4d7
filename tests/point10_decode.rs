use std::io::Cursor;

use laz10::decoders::ArithmeticDecoder;
use laz10::las::point10::{Point10, Point10Decompressor};
use laz10::packers::Packable;

#[test]
fn decoding_an_all_zero_body_repeats_the_seed() {
    // With no encoder in scope, an all-zero compressed body is the one
    // fixture we can construct without hand-deriving arithmetic-coded
    // bytes: a decoder whose `value` never leaves zero always takes the
    // zero-probability-mass branch of every model it queries, so every
    // "changed" flag decodes false and every delta decodes to zero.
    let mut seed = [0u8; 20];
    let seed_point = Point10 {
        x: 1000,
        y: 2000,
        z: 3000,
        intensity: 400,
        number_of_returns_of_given_pulse: 1,
        scan_direction_flag: false,
        edge_of_flight_line: false,
        return_number: 1,
        classification: 2,
        scan_angle_rank: 0,
        user_data: 0,
        point_source_id: 7,
    };
    seed_point.pack_into(&mut seed);

    let mut decompressor = Point10Decompressor::new();
    let mut decoder = ArithmeticDecoder::new(Cursor::new(vec![0u8; 1024]));

    let first = decompressor.read_first(&mut decoder, &seed).unwrap();
    assert_eq!(first, seed_point);

    for _ in 0..64 {
        let point = decompressor.read(&mut decoder).unwrap();
        assert_eq!(point, seed_point);
    }
}

#[test]
fn read_first_consumes_exactly_the_four_init_bytes() {
    use std::io::{Read, Seek, SeekFrom};

    let seed = [0u8; 20];
    let mut decompressor = Point10Decompressor::new();
    let mut decoder = ArithmeticDecoder::new(Cursor::new(vec![0u8; 64]));
    decompressor.read_first(&mut decoder, &seed).unwrap();

    let cursor = decoder.in_stream();
    assert_eq!(cursor.stream_position().unwrap(), 4);
    let mut rest = Vec::new();
    cursor.read_to_end(&mut rest).unwrap();
    assert_eq!(rest.len(), 60);
}

#[test]
fn running_out_of_bytes_surfaces_an_io_error() {
    let seed = [0u8; 20];
    let mut decompressor = Point10Decompressor::new();
    // too short to ever satisfy a renormalization read past init.
    let mut decoder = ArithmeticDecoder::new(Cursor::new(vec![0u8; 4]));
    decompressor.read_first(&mut decoder, &seed).unwrap();

    let result = decompressor.read(&mut decoder);
    assert!(result.is_err());
}
