use bitstream::{packed_u32_len, BitReader, BitWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Bit(bool),
    Bits { bits: u8, value: u64 },
    Byte(u8),
    U32(u32),
    F32(u32),
    Packed(u32),
    Str(String),
    Buffer(Vec<u8>, usize),
}

fn mask_value(bits: u8, value: u64) -> u64 {
    if bits >= 64 {
        value
    } else {
        let mask = (1u64 << bits) - 1;
        value & mask
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::Bit),
        (1u8..=64, any::<u64>()).prop_map(|(bits, value)| Op::Bits {
            bits,
            value: mask_value(bits, value),
        }),
        any::<u8>().prop_map(Op::Byte),
        any::<u32>().prop_map(Op::U32),
        any::<u32>().prop_map(Op::F32),
        any::<u32>().prop_map(Op::Packed),
        "[ -~]{0,24}".prop_map(Op::Str),
        prop::collection::vec(any::<u8>(), 1..8).prop_flat_map(|bytes| {
            let max = bytes.len() * 8;
            (Just(bytes), 0..=max)
        })
        .prop_map(|(bytes, bits)| Op::Buffer(bytes, bits)),
    ]
}

fn masked_buffer(bytes: &[u8], bits: usize) -> Vec<u8> {
    let mut out = vec![0u8; bits.div_ceil(8)];
    for i in 0..bits {
        if (bytes[i / 8] >> (i % 8)) & 1 == 1 {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

proptest! {
    #[test]
    fn prop_fixed_width_roundtrip(bits in 1u8..=64, value in any::<u64>()) {
        let value = mask_value(bits, value);
        let mut writer = BitWriter::unpadded();
        writer.write_bits(value, bits).unwrap();
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(reader.read_bits(bits).unwrap(), value);
    }

    #[test]
    fn prop_packed_is_canonical(value in any::<u32>()) {
        let mut writer = BitWriter::unpadded();
        writer.write_packed_u32(value);
        let bytes = writer.finish();

        prop_assert_eq!(bytes.len(), packed_u32_len(value));
        // Only the last group may clear the continuation bit, and it is never
        // an empty trailing group unless the value itself is zero.
        let last = bytes[bytes.len() - 1];
        prop_assert_eq!(last & 1, 0);
        prop_assert!(bytes.len() == 1 || last != 0);
        for byte in &bytes[..bytes.len() - 1] {
            prop_assert_eq!(byte & 1, 1);
        }

        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(reader.read_packed_u32().unwrap(), value);
        prop_assert!(reader.is_done());
    }

    #[test]
    fn prop_string_roundtrip(value in "[\\x01-\\x7f]{0,64}") {
        let mut writer = BitWriter::unpadded();
        writer.write_string(&value).unwrap();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let mut prefix = BitReader::new(&bytes);
        prop_assert_eq!(prefix.read_u32_le().unwrap() as usize, value.len() + 1);
        prop_assert_eq!(reader.read_string().unwrap(), value);
        prop_assert!(reader.is_done());
    }

    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = BitWriter::new();

        for op in &ops {
            match op {
                Op::Bit(b) => writer.write_bit(*b),
                Op::Bits { bits, value } => writer.write_bits(*value, *bits).unwrap(),
                Op::Byte(v) => writer.write_byte(*v),
                Op::U32(v) => writer.write_u32_le(*v),
                Op::F32(raw) => writer.write_f32_le(f32::from_bits(*raw)),
                Op::Packed(v) => writer.write_packed_u32(*v),
                Op::Str(s) => writer.write_string(s).unwrap(),
                Op::Buffer(bytes, bits) => writer.write_buffer(bytes, *bits).unwrap(),
            }
        }

        let payload = writer.finish_payload();
        let mut reader = payload.reader();

        for op in &ops {
            match op {
                Op::Bit(b) => prop_assert_eq!(reader.read_bit().unwrap(), *b),
                Op::Bits { bits, value } => {
                    prop_assert_eq!(reader.read_bits(*bits).unwrap(), *value);
                }
                Op::Byte(v) => prop_assert_eq!(reader.read_byte().unwrap(), *v),
                Op::U32(v) => prop_assert_eq!(reader.read_u32_le().unwrap(), *v),
                Op::F32(raw) => {
                    prop_assert_eq!(reader.read_f32_le().unwrap().to_bits(), *raw);
                }
                Op::Packed(v) => prop_assert_eq!(reader.read_packed_u32().unwrap(), *v),
                Op::Str(s) => prop_assert_eq!(&reader.read_string().unwrap(), s),
                Op::Buffer(bytes, bits) => {
                    prop_assert_eq!(reader.read_buffer(*bits).unwrap(), masked_buffer(bytes, *bits));
                }
            }
        }
        prop_assert!(reader.is_done());
    }

    #[test]
    fn prop_growth_keeps_prior_bits(positions in prop::collection::btree_set(0usize..256, 1..32)) {
        let max = *positions.iter().next_back().unwrap();
        let mut writer = BitWriter::unpadded();
        for i in 0..=max {
            writer.write_bit(positions.contains(&i));
            prop_assert!(writer.as_bytes().len() >= i / 8 + 1);
        }
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        for i in 0..=max {
            prop_assert_eq!(reader.read_bit().unwrap(), positions.contains(&i));
        }
    }
}
