//! Property tests for operand canonicalization and offset bookkeeping

use ilcodec_bytecode::{EntityHandle, Opcode, TableIndex, Token};
use ilcodec_encoder::{EncodeError, InstructionEncoder};
use proptest::prelude::*;

/// One emission call, as a test input
#[derive(Debug, Clone)]
enum Emit {
    Opcode(Opcode),
    Token(u32),
    ConstI4(i32),
    ConstI8(i64),
    ConstR4(u32),
    ConstR8(u64),
    LoadLocal(u32),
    StoreLocal(u32),
    LoadLocalAddress(u32),
    LoadArgument(u32),
    LoadArgumentAddress(u32),
    StoreArgument(u32),
    Call(u32),
    ShortTarget(i8),
    LongTarget(i32),
}

fn slot() -> impl Strategy<Value = u32> {
    prop_oneof![0u32..4, 4u32..255, 255u32..=u32::MAX]
}

fn emit() -> impl Strategy<Value = Emit> {
    prop_oneof![
        prop::sample::select(Opcode::ALL).prop_map(Emit::Opcode),
        any::<u32>().prop_map(Emit::Token),
        any::<i32>().prop_map(Emit::ConstI4),
        (-200i32..200).prop_map(Emit::ConstI4),
        any::<i64>().prop_map(Emit::ConstI8),
        any::<u32>().prop_map(Emit::ConstR4),
        any::<u64>().prop_map(Emit::ConstR8),
        slot().prop_map(Emit::LoadLocal),
        slot().prop_map(Emit::StoreLocal),
        slot().prop_map(Emit::LoadLocalAddress),
        slot().prop_map(Emit::LoadArgument),
        slot().prop_map(Emit::LoadArgumentAddress),
        slot().prop_map(Emit::StoreArgument),
        (1u32..=0x00FF_FFFF).prop_map(Emit::Call),
        any::<i8>().prop_map(Emit::ShortTarget),
        any::<i32>().prop_map(Emit::LongTarget),
    ]
}

/// Bytes the call must produce, computed independently of the encoder
fn expected_width(call: &Emit) -> usize {
    let indexed = |index: u32, fast: bool| match index {
        0..=3 if fast => 1,
        0..=254 => 2,
        _ => 6,
    };
    match call {
        Emit::Opcode(op) => usize::from(op.value() > 0xFF) + 1,
        Emit::Token(_) | Emit::LongTarget(_) => 4,
        Emit::ShortTarget(_) => 1,
        Emit::ConstI4(v) => match v {
            -1..=8 => 1,
            -128..=127 => 2,
            _ => 5,
        },
        Emit::ConstI8(_) | Emit::ConstR8(_) => 9,
        Emit::ConstR4(_) | Emit::Call(_) => 5,
        Emit::LoadLocal(i) | Emit::StoreLocal(i) | Emit::LoadArgument(i) => indexed(*i, true),
        Emit::LoadLocalAddress(i) | Emit::LoadArgumentAddress(i) | Emit::StoreArgument(i) => {
            indexed(*i, false)
        }
    }
}

fn apply(enc: &mut InstructionEncoder<'_, Vec<u8>>, call: &Emit) -> Result<(), EncodeError> {
    match *call {
        Emit::Opcode(op) => enc.opcode(op),
        Emit::Token(t) => enc.token(Token::new(t)),
        Emit::ConstI4(v) => enc.load_constant_i4(v),
        Emit::ConstI8(v) => enc.load_constant_i8(v),
        Emit::ConstR4(bits) => enc.load_constant_r4(f32::from_bits(bits)),
        Emit::ConstR8(bits) => enc.load_constant_r8(f64::from_bits(bits)),
        Emit::LoadLocal(i) => enc.load_local(i),
        Emit::StoreLocal(i) => enc.store_local(i),
        Emit::LoadLocalAddress(i) => enc.load_local_address(i),
        Emit::LoadArgument(i) => enc.load_argument(i),
        Emit::LoadArgumentAddress(i) => enc.load_argument_address(i),
        Emit::StoreArgument(i) => enc.store_argument(i),
        Emit::Call(row) => enc.call(EntityHandle::new(TableIndex::MemberRef, row)?),
        Emit::ShortTarget(o) => enc.short_branch_target(o),
        Emit::LongTarget(o) => enc.long_branch_target(o),
    }
}

proptest! {
    #[test]
    fn offset_is_sum_of_widths(prefix in prop::collection::vec(any::<u8>(), 0..8),
                               calls in prop::collection::vec(emit(), 0..64)) {
        let mut blob = prefix.clone();
        let mut enc = InstructionEncoder::new(&mut blob);
        prop_assert_eq!(enc.offset(), 0);

        let mut total = 0;
        for call in &calls {
            apply(&mut enc, call).unwrap();
            total += expected_width(call);
            prop_assert_eq!(enc.offset(), total, "after {:?}", call);
        }
        prop_assert_eq!(blob.len(), prefix.len() + total);
        prop_assert_eq!(&blob[..prefix.len()], &prefix[..]);
    }

    #[test]
    fn long_constants_decode_back(value in any::<i32>().prop_filter("needs ldc.i4", |v| i8::try_from(*v).is_err())) {
        let mut blob: Vec<u8> = Vec::new();
        InstructionEncoder::new(&mut blob).load_constant_i4(value).unwrap();
        prop_assert_eq!(blob[0], 0x20);
        prop_assert_eq!(i32::from_le_bytes(blob[1..5].try_into().unwrap()), value);
    }

    #[test]
    fn short_constants_are_one_signed_byte(value in -128i32..=127) {
        prop_assume!(!(-1..=8).contains(&value));
        let mut blob: Vec<u8> = Vec::new();
        InstructionEncoder::new(&mut blob).load_constant_i4(value).unwrap();
        prop_assert_eq!(blob.len(), 2);
        prop_assert_eq!(blob[0], 0x1F);
        prop_assert_eq!(blob[1] as i8, value as i8);
    }

    #[test]
    fn float_bits_roundtrip(single in any::<u32>(), double in any::<u64>()) {
        let mut blob: Vec<u8> = Vec::new();
        let mut enc = InstructionEncoder::new(&mut blob);
        enc.load_constant_r4(f32::from_bits(single)).unwrap();
        enc.load_constant_r8(f64::from_bits(double)).unwrap();
        prop_assert_eq!(u32::from_le_bytes(blob[1..5].try_into().unwrap()), single);
        prop_assert_eq!(u64::from_le_bytes(blob[6..14].try_into().unwrap()), double);
    }

    #[test]
    fn slot_operand_matches_index(slot in 4u32..=u32::MAX) {
        type Op = fn(&mut InstructionEncoder<'_, Vec<u8>>, u32) -> Result<(), EncodeError>;
        let forms: [(Op, u8, [u8; 2]); 6] = [
            (|e, i| e.load_local(i), 0x11, [0xFE, 0x0C]),
            (|e, i| e.store_local(i), 0x13, [0xFE, 0x0E]),
            (|e, i| e.load_local_address(i), 0x12, [0xFE, 0x0D]),
            (|e, i| e.load_argument(i), 0x0E, [0xFE, 0x09]),
            (|e, i| e.load_argument_address(i), 0x0F, [0xFE, 0x0A]),
            (|e, i| e.store_argument(i), 0x10, [0xFE, 0x0B]),
        ];
        for (op, short, long) in forms {
            let mut blob: Vec<u8> = Vec::new();
            op(&mut InstructionEncoder::new(&mut blob), slot).unwrap();
            if slot < 255 {
                prop_assert_eq!(blob, vec![short, slot as u8]);
            } else {
                prop_assert_eq!(&blob[..2], &long[..]);
                prop_assert_eq!(u32::from_le_bytes(blob[2..6].try_into().unwrap()), slot);
            }
        }
    }

    #[test]
    fn token_width_ignores_value(raw in any::<u32>()) {
        let mut blob: Vec<u8> = Vec::new();
        InstructionEncoder::new(&mut blob).token(raw).unwrap();
        prop_assert_eq!(blob, raw.to_le_bytes().to_vec());
    }
}
