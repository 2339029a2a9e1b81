//! Opcode table consistency tests
//!
//! The opcode table is generated from a single declarative list. These tests
//! check the properties downstream assemblers and disassemblers rely on.

use std::collections::HashSet;

use ilcodec_bytecode::{EXTENDED_OPCODE_PREFIX, Opcode, OpcodeEncoding};

#[test]
fn test_table_size() {
    // 191 base-page opcodes, 28 extended
    let one_byte = Opcode::ALL.iter().filter(|op| op.size() == 1).count();
    let two_byte = Opcode::ALL.iter().filter(|op| op.size() == 2).count();
    assert_eq!(one_byte, 191);
    assert_eq!(two_byte, 28);
}

#[test]
fn test_values_and_mnemonics_are_unique() {
    let values: HashSet<u16> = Opcode::ALL.iter().map(|op| op.value()).collect();
    let mnemonics: HashSet<&str> = Opcode::ALL.iter().map(|op| op.mnemonic()).collect();
    assert_eq!(values.len(), Opcode::ALL.len());
    assert_eq!(mnemonics.len(), Opcode::ALL.len());
}

#[test]
fn test_every_opcode_encodes_by_width() {
    for &op in Opcode::ALL {
        let bytes = op.encoding().to_bytes();
        match op.encoding() {
            OpcodeEncoding::OneByte(byte) => {
                assert_eq!(u16::from(byte), op.value(), "{op}");
                assert_eq!(bytes, vec![byte]);
            }
            OpcodeEncoding::TwoByte { prefix, selector } => {
                assert_eq!(prefix, EXTENDED_OPCODE_PREFIX, "{op}");
                assert_eq!(bytes, op.value().to_be_bytes().to_vec(), "{op}");
                assert_eq!(bytes, vec![prefix, selector]);
            }
        }
        assert_eq!(Opcode::from_bytes(&bytes), Ok((op, bytes.len())));
    }
}

#[test]
fn test_lookup_roundtrip() {
    for &op in Opcode::ALL {
        assert_eq!(Opcode::from_value(op.value()), Some(op));
        assert_eq!(Opcode::try_from(op.value()), Ok(op));
        assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Ok(op));
    }
}

#[test]
fn test_branch_pairs_are_symmetric() {
    for &op in Opcode::ALL.iter().filter(|op| op.is_branch()) {
        let short = op.short_branch_form().unwrap();
        let long = op.long_branch_form().unwrap();
        assert!(short.is_short_branch());
        assert!(long.is_long_branch());
        assert_eq!(short.long_branch_form(), Some(long));
        assert_eq!(long.short_branch_form(), Some(short));
        assert_eq!(format!("{short}"), format!("{long}.s"));
    }
}

#[test]
fn test_serde_by_variant_name() {
    let json = serde_json::to_string(&Opcode::LdcI4S).unwrap();
    assert_eq!(json, "\"LdcI4S\"");
    let back: Opcode = serde_json::from_str("\"Ceq\"").unwrap();
    assert_eq!(back, Opcode::Ceq);
}
