//! Opcode table and decoder tests

use crate::cpu_6502::{decode, fields, AddressingMode, Mnemonic, OPCODE_TABLE};

#[test]
fn table_has_151_documented_opcodes() {
    let count = OPCODE_TABLE.iter().filter(|e| e.is_some()).count();
    assert_eq!(count, 151);
}

#[test]
fn table_matches_decoder() {
    for op in 0..=255u8 {
        assert_eq!(OPCODE_TABLE[op as usize], decode(op), "opcode {:02X}", op);
    }
}

#[test]
fn group_three_is_empty() {
    for op in (0..=255u8).filter(|op| op & 0b11 == 0b11) {
        assert!(decode(op).is_none(), "opcode {:02X}", op);
    }
}

#[test]
fn bit_fields() {
    // LDA ($nn),Y = 101 100 01
    assert_eq!(fields(0xB1), (1, 5, 4));
    // STX $nn = 100 001 10
    assert_eq!(fields(0x86), (2, 4, 1));
}

#[test]
fn spot_check_entries() {
    let cases = [
        (0xA9, Mnemonic::Lda, Some(AddressingMode::Immediate), 2),
        (0xB1, Mnemonic::Lda, Some(AddressingMode::IndirectIndexedY), 5),
        (0x8D, Mnemonic::Sta, Some(AddressingMode::Absolute), 4),
        (0x9D, Mnemonic::Sta, Some(AddressingMode::AbsoluteX), 5),
        (0x0A, Mnemonic::Asl, Some(AddressingMode::Accumulator), 2),
        (0xFE, Mnemonic::Inc, Some(AddressingMode::AbsoluteX), 7),
        (0x96, Mnemonic::Stx, Some(AddressingMode::ZeroPageY), 4),
        (0xBE, Mnemonic::Ldx, Some(AddressingMode::AbsoluteY), 4),
        (0xB6, Mnemonic::Ldx, Some(AddressingMode::ZeroPageY), 4),
        (0x4C, Mnemonic::Jmp, Some(AddressingMode::Absolute), 3),
        (0x6C, Mnemonic::JmpIndirect, Some(AddressingMode::Absolute), 5),
        (0x20, Mnemonic::Jsr, Some(AddressingMode::Absolute), 6),
        (0x00, Mnemonic::Brk, None, 7),
        (0x40, Mnemonic::Rti, None, 6),
        (0x10, Mnemonic::Bpl, None, 2),
        (0xF0, Mnemonic::Beq, None, 2),
        (0x08, Mnemonic::Php, None, 3),
        (0x68, Mnemonic::Pla, None, 4),
        (0x9A, Mnemonic::Txs, None, 2),
        (0xBA, Mnemonic::Tsx, None, 2),
        (0xEA, Mnemonic::Nop, None, 2),
        (0x24, Mnemonic::Bit, Some(AddressingMode::ZeroPage), 3),
        (0xE0, Mnemonic::Cpx, Some(AddressingMode::Immediate), 2),
        (0xA0, Mnemonic::Ldy, Some(AddressingMode::Immediate), 2),
    ];
    for (op, mnemonic, mode, cycles) in cases {
        let instr = decode(op).unwrap_or_else(|| panic!("opcode {:02X} missing", op));
        assert_eq!(instr.mnemonic, mnemonic, "opcode {:02X}", op);
        assert_eq!(instr.mode, mode, "opcode {:02X}", op);
        assert_eq!(instr.cycles, cycles, "opcode {:02X}", op);
    }
}

#[test]
fn rejected_mode_combinations() {
    // STA #imm, STX #imm, STY #imm, STX abs,Y, STY abs,X, BIT zp,X,
    // INC #imm, DEC #imm, JMP zp, ASL #imm, CPX zp,X
    for op in [0x89, 0x82, 0x80, 0x9E, 0x9C, 0x34, 0xE2, 0xC2, 0x44, 0x02, 0xF4] {
        assert!(decode(op).is_none(), "opcode {:02X} should be illegal", op);
    }
}

#[test]
fn instruction_sizes() {
    assert_eq!(decode(0xEA).map(|i| i.size()), Some(1));
    assert_eq!(decode(0xD0).map(|i| i.size()), Some(2));
    assert_eq!(decode(0xA5).map(|i| i.size()), Some(2));
    assert_eq!(decode(0x6C).map(|i| i.size()), Some(3));
}

#[test]
fn disassembly() {
    use crate::cpu_6502::disassemble;
    assert_eq!(disassemble(&[0xA9, 0x2A]), "LDA #$2A");
    assert_eq!(disassemble(&[0x6C, 0xFF, 0x02]), "JMP ($02FF)");
    assert_eq!(disassemble(&[0xD0, 0xFE]), "BNE -2");
    assert_eq!(disassemble(&[0x0A]), "ASL A");
    assert_eq!(disassemble(&[0x60]), "RTS");
    assert_eq!(disassemble(&[0xFF]), "??? $FF");
}
