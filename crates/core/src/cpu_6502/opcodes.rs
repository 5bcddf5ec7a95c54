//! Opcode decoding and the 256-entry dispatch table
//!
//! A documented 6502 opcode is laid out as `aaabbbcc`:
//!
//! - `cc`  instruction group (0, 1 or 2; group 3 holds no documented opcodes)
//! - `aaa` instruction index within the group
//! - `bbb` addressing-mode code, interpreted through a per-group table
//!
//! Group 0 overloads a few addressing-mode codes for whole instruction
//! families (branches, stack ops, flag ops). [`decode`] spells these rules out
//! once; [`OPCODE_TABLE`] is built from it at compile time so the hot path is
//! a single array lookup.

use super::addressing::AddressingMode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    JmpIndirect,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

impl Mnemonic {
    pub const fn name(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Adc => "ADC",
            And => "AND",
            Asl => "ASL",
            Bcc => "BCC",
            Bcs => "BCS",
            Beq => "BEQ",
            Bit => "BIT",
            Bmi => "BMI",
            Bne => "BNE",
            Bpl => "BPL",
            Brk => "BRK",
            Bvc => "BVC",
            Bvs => "BVS",
            Clc => "CLC",
            Cld => "CLD",
            Cli => "CLI",
            Clv => "CLV",
            Cmp => "CMP",
            Cpx => "CPX",
            Cpy => "CPY",
            Dec => "DEC",
            Dex => "DEX",
            Dey => "DEY",
            Eor => "EOR",
            Inc => "INC",
            Inx => "INX",
            Iny => "INY",
            Jmp | JmpIndirect => "JMP",
            Jsr => "JSR",
            Lda => "LDA",
            Ldx => "LDX",
            Ldy => "LDY",
            Lsr => "LSR",
            Nop => "NOP",
            Ora => "ORA",
            Pha => "PHA",
            Php => "PHP",
            Pla => "PLA",
            Plp => "PLP",
            Rol => "ROL",
            Ror => "ROR",
            Rti => "RTI",
            Rts => "RTS",
            Sbc => "SBC",
            Sec => "SEC",
            Sed => "SED",
            Sei => "SEI",
            Sta => "STA",
            Stx => "STX",
            Sty => "STY",
            Tax => "TAX",
            Tay => "TAY",
            Tsx => "TSX",
            Txa => "TXA",
            Txs => "TXS",
            Tya => "TYA",
        }
    }

    /// Instructions that only read their operand and therefore pay one extra
    /// cycle when indexing crosses a page.
    pub const fn is_read(self) -> bool {
        use Mnemonic::*;
        matches!(
            self,
            Adc | And | Bit | Cmp | Cpx | Cpy | Eor | Lda | Ldx | Ldy | Ora | Sbc
        )
    }

    const fn is_store(self) -> bool {
        matches!(self, Mnemonic::Sta | Mnemonic::Stx | Mnemonic::Sty)
    }

    pub const fn is_branch(self) -> bool {
        use Mnemonic::*;
        matches!(self, Bpl | Bmi | Bvc | Bvs | Bcc | Bcs | Bne | Beq)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatch descriptor for one opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    /// `None` for instructions that take no operand or fetch their own
    /// (branches fetch a signed displacement).
    pub mode: Option<AddressingMode>,
    /// Base cycle cost, before page-cross and branch penalties.
    pub cycles: u8,
}

impl Instruction {
    const fn new(mnemonic: Mnemonic, mode: Option<AddressingMode>) -> Self {
        Self {
            mnemonic,
            mode,
            cycles: base_cycles(mnemonic, mode),
        }
    }

    /// Total encoded length including the opcode byte.
    pub const fn size(&self) -> u16 {
        match self.mode {
            Some(mode) => 1 + mode.operand_len(),
            None if self.mnemonic.is_branch() => 2,
            None => 1,
        }
    }
}

/// Split an opcode into `(group, index, addressing-mode code)`.
pub const fn fields(opcode: u8) -> (u8, u8, u8) {
    (opcode & 0b11, (opcode >> 5) & 0b111, (opcode >> 2) & 0b111)
}

const fn group0_mode(code: u8) -> Option<AddressingMode> {
    match code {
        0 => Some(AddressingMode::Immediate),
        1 => Some(AddressingMode::ZeroPage),
        3 => Some(AddressingMode::Absolute),
        5 => Some(AddressingMode::ZeroPageX),
        7 => Some(AddressingMode::AbsoluteX),
        _ => None,
    }
}

const fn group1_mode(code: u8) -> AddressingMode {
    match code {
        0 => AddressingMode::IndexedIndirectX,
        1 => AddressingMode::ZeroPage,
        2 => AddressingMode::Immediate,
        3 => AddressingMode::Absolute,
        4 => AddressingMode::IndirectIndexedY,
        5 => AddressingMode::ZeroPageX,
        6 => AddressingMode::AbsoluteY,
        _ => AddressingMode::AbsoluteX,
    }
}

const fn group2_mode(code: u8) -> Option<AddressingMode> {
    match code {
        0 => Some(AddressingMode::Immediate),
        1 => Some(AddressingMode::ZeroPage),
        2 => Some(AddressingMode::Accumulator),
        3 => Some(AddressingMode::Absolute),
        5 => Some(AddressingMode::ZeroPageX),
        7 => Some(AddressingMode::AbsoluteX),
        _ => None,
    }
}

const fn implied(mnemonic: Mnemonic) -> Option<Instruction> {
    Some(Instruction::new(mnemonic, None))
}

const fn with_mode(mnemonic: Mnemonic, mode: AddressingMode) -> Option<Instruction> {
    Some(Instruction::new(mnemonic, Some(mode)))
}

/// Decode one opcode byte. Returns `None` for every combination that is not a
/// documented instruction.
pub const fn decode(opcode: u8) -> Option<Instruction> {
    let (group, index, code) = fields(opcode);
    match group {
        0 => decode_group0(index, code),
        1 => decode_group1(index, code),
        2 => decode_group2(index, code),
        _ => None,
    }
}

const fn decode_group0(index: u8, code: u8) -> Option<Instruction> {
    use AddressingMode::*;
    use Mnemonic::*;

    if code == 0b000 && index < 4 {
        return match index {
            0 => implied(Brk),
            1 => with_mode(Jsr, Absolute),
            2 => implied(Rti),
            _ => implied(Rts),
        };
    }
    if code == 0b010 {
        let mnemonic = match index {
            0 => Php,
            1 => Plp,
            2 => Pha,
            3 => Pla,
            4 => Dey,
            5 => Tay,
            6 => Iny,
            _ => Inx,
        };
        return implied(mnemonic);
    }
    if code == 0b100 {
        // Bits 7-6 pick the flag, bit 5 the polarity tested for.
        let mnemonic = match index {
            0 => Bpl,
            1 => Bmi,
            2 => Bvc,
            3 => Bvs,
            4 => Bcc,
            5 => Bcs,
            6 => Bne,
            _ => Beq,
        };
        return implied(mnemonic);
    }
    if code == 0b110 {
        let mnemonic = match index {
            0 => Clc,
            1 => Sec,
            2 => Cli,
            3 => Sei,
            4 => Tya,
            5 => Clv,
            6 => Cld,
            _ => Sed,
        };
        return implied(mnemonic);
    }

    let mode = match group0_mode(code) {
        Some(mode) => mode,
        None => return None,
    };
    match index {
        1 => match mode {
            ZeroPage | Absolute => with_mode(Bit, mode),
            _ => None,
        },
        2 => match mode {
            Absolute => with_mode(Jmp, mode),
            _ => None,
        },
        3 => match mode {
            Absolute => with_mode(JmpIndirect, mode),
            _ => None,
        },
        4 => match mode {
            ZeroPage | Absolute | ZeroPageX => with_mode(Sty, mode),
            _ => None,
        },
        5 => with_mode(Ldy, mode),
        6 => match mode {
            Immediate | ZeroPage | Absolute => with_mode(Cpy, mode),
            _ => None,
        },
        7 => match mode {
            Immediate | ZeroPage | Absolute => with_mode(Cpx, mode),
            _ => None,
        },
        _ => None,
    }
}

const fn decode_group1(index: u8, code: u8) -> Option<Instruction> {
    use Mnemonic::*;

    let mode = group1_mode(code);
    let mnemonic = match index {
        0 => Ora,
        1 => And,
        2 => Eor,
        3 => Adc,
        4 => Sta,
        5 => Lda,
        6 => Cmp,
        _ => Sbc,
    };
    if mnemonic.is_store() && matches!(mode, AddressingMode::Immediate) {
        return None;
    }
    with_mode(mnemonic, mode)
}

const fn decode_group2(index: u8, code: u8) -> Option<Instruction> {
    use AddressingMode::*;
    use Mnemonic::*;

    if index >= 4 && code == 0b010 {
        let mnemonic = match index {
            4 => Txa,
            5 => Tax,
            6 => Dex,
            _ => Nop,
        };
        return implied(mnemonic);
    }
    if index >= 4 && code == 0b110 {
        return match index {
            4 => implied(Txs),
            5 => implied(Tsx),
            _ => None,
        };
    }

    let mode = match group2_mode(code) {
        Some(mode) => mode,
        None => return None,
    };
    match index {
        0..=3 => {
            let mnemonic = match index {
                0 => Asl,
                1 => Rol,
                2 => Lsr,
                _ => Ror,
            };
            match mode {
                Immediate => None,
                _ => with_mode(mnemonic, mode),
            }
        }
        // STX and LDX index with Y where the rest of the group uses X.
        4 => match mode {
            ZeroPage | Absolute => with_mode(Stx, mode),
            ZeroPageX => with_mode(Stx, ZeroPageY),
            _ => None,
        },
        5 => match mode {
            Immediate | ZeroPage | Absolute => with_mode(Ldx, mode),
            ZeroPageX => with_mode(Ldx, ZeroPageY),
            AbsoluteX => with_mode(Ldx, AbsoluteY),
            _ => None,
        },
        _ => {
            let mnemonic = if index == 6 { Dec } else { Inc };
            match mode {
                ZeroPage | Absolute | ZeroPageX | AbsoluteX => with_mode(mnemonic, mode),
                _ => None,
            }
        }
    }
}

const fn base_cycles(mnemonic: Mnemonic, mode: Option<AddressingMode>) -> u8 {
    use AddressingMode::*;
    use Mnemonic::*;

    let mode = match mode {
        Some(mode) => mode,
        None => {
            return match mnemonic {
                Brk => 7,
                Rti | Rts => 6,
                Pla | Plp => 4,
                Pha | Php => 3,
                _ => 2,
            };
        }
    };
    match mnemonic {
        Jmp => 3,
        JmpIndirect => 5,
        Jsr => 6,
        Asl | Lsr | Rol | Ror | Inc | Dec => match mode {
            Accumulator => 2,
            ZeroPage => 5,
            ZeroPageX | Absolute => 6,
            _ => 7,
        },
        Sta | Stx | Sty => match mode {
            ZeroPage => 3,
            ZeroPageX | ZeroPageY | Absolute => 4,
            AbsoluteX | AbsoluteY => 5,
            _ => 6,
        },
        _ => match mode {
            Immediate | Accumulator => 2,
            ZeroPage => 3,
            ZeroPageX | ZeroPageY | Absolute | AbsoluteX | AbsoluteY => 4,
            IndirectIndexedY => 5,
            IndexedIndirectX => 6,
        },
    }
}

const fn build_table() -> [Option<Instruction>; 256] {
    let mut table = [None; 256];
    let mut op = 0;
    while op < 256 {
        table[op] = decode(op as u8);
        op += 1;
    }
    table
}

/// Opcode byte to instruction descriptor; `None` marks illegal opcodes.
pub static OPCODE_TABLE: [Option<Instruction>; 256] = build_table();

/// Disassemble the instruction starting at `bytes[0]`.
///
/// Missing trailing operand bytes read as zero. Branch operands are shown as
/// the signed displacement.
pub fn disassemble(bytes: &[u8]) -> String {
    let opcode = bytes.first().copied().unwrap_or(0);
    let operand = [
        bytes.get(1).copied().unwrap_or(0),
        bytes.get(2).copied().unwrap_or(0),
    ];
    match OPCODE_TABLE[opcode as usize] {
        None => format!("??? ${:02X}", opcode),
        Some(Instruction {
            mnemonic: Mnemonic::JmpIndirect,
            ..
        }) => format!("JMP (${:04X})", u16::from_le_bytes(operand)),
        Some(Instruction {
            mnemonic,
            mode: Some(mode),
            ..
        }) => format!("{} {}", mnemonic, mode.format_operand(operand)),
        Some(Instruction { mnemonic, .. }) if mnemonic.is_branch() => {
            format!("{} {:+}", mnemonic, operand[0] as i8)
        }
        Some(Instruction { mnemonic, .. }) => mnemonic.to_string(),
    }
}
