// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR (Common Data Representation) wire format tests.
//!
//! Expected byte images are built independently with `byteorder`.

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use fastcdr::{Cdr, CdrType, DdsCdrPlFlag, Endianness, FastBuffer, LongDouble};

fn pad(bytes: &mut Vec<u8>, boundary: usize) {
    while bytes.len() % boundary != 0 {
        bytes.push(0);
    }
}

/// Byte image of the mixed record used by several tests:
/// u8, u32, u16, f64, i64, bool.
fn expected_record<E: ByteOrder>() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.write_u8(0x11).expect("write u8");
    pad(&mut bytes, 4);
    bytes.write_u32::<E>(0xAABB_CCDD).expect("write u32");
    bytes.write_u16::<E>(0x0102).expect("write u16");
    pad(&mut bytes, 8);
    bytes.write_f64::<E>(1.5).expect("write f64");
    bytes.write_i64::<E>(-2).expect("write i64");
    bytes.write_u8(1).expect("write bool");
    bytes
}

fn write_record(cdr: &mut Cdr<'_>) {
    cdr.serialize(0x11u8)
        .expect("u8")
        .serialize(0xAABB_CCDDu32)
        .expect("u32")
        .serialize(0x0102u16)
        .expect("u16")
        .serialize(1.5f64)
        .expect("f64")
        .serialize(-2i64)
        .expect("i64")
        .serialize_bool(true)
        .expect("bool");
}

// ============================================================================
// Primitive layout
// ============================================================================

#[test]
fn test_int32_big_endian_bytes() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
    cdr.serialize(0x0102_0304i32).expect("serialize i32");
    assert_eq!(cdr.data(), &[0x01, 0x02, 0x03, 0x04]);
}

#[test]
fn test_int32_read_by_little_endian_engine() {
    let mut buffer = FastBuffer::from_vec(vec![0x01, 0x02, 0x03, 0x04]);
    let mut cdr = Cdr::new(&mut buffer, Endianness::Little, CdrType::CorbaCdr);
    assert_eq!(cdr.deserialize::<i32>().expect("read i32"), 0x0403_0201);
}

#[test]
fn test_record_layout_big_endian() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
    write_record(&mut cdr);
    assert_eq!(cdr.data(), expected_record::<BigEndian>().as_slice());
}

#[test]
fn test_record_layout_little_endian() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Little, CdrType::CorbaCdr);
    write_record(&mut cdr);
    assert_eq!(cdr.data(), expected_record::<LittleEndian>().as_slice());
}

#[test]
fn test_alignment_is_relative_to_header() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
    cdr.serialize_encapsulation().expect("header");
    cdr.serialize(1u8).expect("u8");
    cdr.serialize(2u64).expect("u64");

    // One header byte, one u8, then seven pad bytes counted from offset 1.
    let mut expected = vec![0x00, 0x01];
    expected.extend_from_slice(&[0; 7]);
    expected.write_u64::<BigEndian>(2).expect("write u64");
    assert_eq!(cdr.data(), expected.as_slice());
}

#[test]
fn test_long_double_layout() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Little, CdrType::CorbaCdr);
    cdr.serialize(7u32).expect("u32");
    cdr.serialize(LongDouble::from_f64(-2.0)).expect("long double");

    let mut expected = Vec::new();
    expected.write_u32::<LittleEndian>(7).expect("write u32");
    pad(&mut expected, 8);
    expected
        .write_u128::<LittleEndian>(0xc000_0000_0000_0000_0000_0000_0000_0000)
        .expect("write u128");
    assert_eq!(cdr.data(), expected.as_slice());
}

#[test]
fn test_wchar_is_four_bytes() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
    cdr.serialize_wchar('\u{1F600}').expect("wchar");
    assert_eq!(cdr.data(), &[0x00, 0x01, 0xF6, 0x00]);
}

// ============================================================================
// Strings and sequences
// ============================================================================

#[test]
fn test_string_layout() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
    cdr.serialize_string("ab").expect("string");
    assert_eq!(cdr.data(), &[0x00, 0x00, 0x00, 0x03, 0x61, 0x62, 0x00]);
}

#[test]
fn test_null_and_empty_string_layout() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Little, CdrType::CorbaCdr);
    cdr.serialize_string(None).expect("null string");
    cdr.serialize_string("").expect("empty string");
    assert_eq!(cdr.data(), &[0, 0, 0, 0, 1, 0, 0, 0, 0]);
}

#[test]
fn test_bool_sequence_layout() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
    cdr.serialize_bool_sequence(&[true, false, true])
        .expect("bool sequence");
    assert_eq!(cdr.data(), &[0x00, 0x00, 0x00, 0x03, 0x01, 0x00, 0x01]);
}

#[test]
fn test_sequence_layout_after_byte() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Little, CdrType::CorbaCdr);
    cdr.serialize(0xFFu8).expect("u8");
    cdr.serialize_sequence(&[1.0f64, -1.0]).expect("sequence");

    let mut expected = vec![0xFF];
    pad(&mut expected, 4);
    expected.write_u32::<LittleEndian>(2).expect("count");
    pad(&mut expected, 8);
    expected.write_f64::<LittleEndian>(1.0).expect("f64");
    expected.write_f64::<LittleEndian>(-1.0).expect("f64");
    assert_eq!(cdr.data(), expected.as_slice());
}

#[test]
fn test_string_rejects_interior_nul() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
    let err = cdr.serialize_string("a\0b").unwrap_err();
    assert!(err.is_invalid_encoding());
    assert_eq!(cdr.position(), 0);
}

// ============================================================================
// Byte order overrides
// ============================================================================

#[test]
fn test_per_call_endianness_override() {
    let mut buffer = FastBuffer::new();
    let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
    let swap = cdr.swap_bytes();
    cdr.serialize_with_endianness(0x0102_0304u32, Endianness::Little)
        .expect("little u32");
    assert_eq!(cdr.swap_bytes(), swap);
    cdr.serialize(0x0102_0304u32).expect("big u32");

    assert_eq!(
        cdr.data(),
        &[0x04, 0x03, 0x02, 0x01, 0x01, 0x02, 0x03, 0x04]
    );

    cdr.reset();
    assert_eq!(
        cdr.deserialize_with_endianness::<u32>(Endianness::Little)
            .expect("little u32"),
        0x0102_0304
    );
    assert_eq!(cdr.deserialize::<u32>().expect("big u32"), 0x0102_0304);
}

#[test]
fn test_override_restores_swap_on_failure() {
    let mut buffer = FastBuffer::from_vec(vec![0; 2]);
    let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
    let swap = cdr.swap_bytes();
    assert!(cdr
        .serialize_with_endianness(1u32, Endianness::Little)
        .is_err());
    assert_eq!(cdr.swap_bytes(), swap);
}

// ============================================================================
// Encapsulation
// ============================================================================

#[test]
fn test_dds_encapsulation_round_trip() {
    for endianness in [Endianness::Big, Endianness::Little] {
        for pl_flag in [DdsCdrPlFlag::WithoutPl, DdsCdrPlFlag::WithPl] {
            let mut buffer = FastBuffer::new();
            let mut cdr = Cdr::new(&mut buffer, endianness, CdrType::DdsCdr);
            cdr.set_dds_cdr_pl_flag(pl_flag);
            cdr.set_dds_cdr_options(0x0A0B);
            cdr.serialize_encapsulation().expect("write header");
            cdr.serialize(99u64).expect("payload");
            let bytes = cdr.data().to_vec();
            assert_eq!(bytes[1], pl_flag as u8 | endianness as u8);

            let mut input = FastBuffer::from_vec(bytes);
            let mut reader = Cdr::new(&mut input, endianness.opposite(), CdrType::DdsCdr);
            reader.read_encapsulation().expect("read header");
            assert_eq!(reader.endianness(), endianness);
            assert_eq!(reader.dds_cdr_pl_flag(), pl_flag);
            assert_eq!(reader.dds_cdr_options(), 0x0A0B);
            assert_eq!(reader.deserialize::<u64>().expect("payload"), 99);
        }
    }
}

#[test]
fn test_corba_stream_with_pl_bit_is_rejected() {
    let mut buffer = FastBuffer::from_vec(vec![0x02, 0, 0, 0]);
    let mut cdr = Cdr::new(&mut buffer, Endianness::Little, CdrType::CorbaCdr);
    let before = cdr.state();
    let err = cdr.read_encapsulation().unwrap_err();
    assert!(err.is_invalid_encoding());
    assert_eq!(cdr.state(), before);
    assert_eq!(cdr.endianness(), Endianness::Little);
}
