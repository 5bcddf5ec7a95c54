//! ADC/SBC, logical operation, compare and BIT tests

use super::cpu_with;
use crate::cpu_6502::{ArrayMemory, Cpu6502};

fn adc(a: u8, operand: u8, carry: bool) -> Cpu6502<ArrayMemory> {
    let mut cpu = cpu_with(&[0x69, operand]);
    cpu.a = a;
    cpu.status.set_carry(carry);
    cpu.step().unwrap();
    cpu
}

fn sbc(a: u8, operand: u8, carry: bool) -> Cpu6502<ArrayMemory> {
    let mut cpu = cpu_with(&[0xE9, operand]);
    cpu.a = a;
    cpu.status.set_carry(carry);
    cpu.step().unwrap();
    cpu
}

#[test]
fn adc_positive_overflow() {
    let cpu = adc(0x7F, 0x01, false);
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.status.overflow());
    assert!(!cpu.status.carry());
    assert!(cpu.status.negative());
    assert!(!cpu.status.zero());
}

#[test]
fn adc_carry_out_and_zero() {
    let cpu = adc(0xFF, 0x01, false);
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.status.carry());
    assert!(cpu.status.zero());
    assert!(!cpu.status.overflow());
}

#[test]
fn adc_uses_carry_in() {
    let cpu = adc(0x10, 0x20, true);
    assert_eq!(cpu.a, 0x31);
    assert!(!cpu.status.carry());
}

#[test]
fn adc_negative_overflow() {
    // -128 + -1 = +127 with overflow
    let cpu = adc(0x80, 0xFF, false);
    assert_eq!(cpu.a, 0x7F);
    assert!(cpu.status.overflow());
    assert!(cpu.status.carry());
}

#[test]
fn adc_ignores_decimal_flag() {
    let mut cpu = cpu_with(&[0x69, 0x01]);
    cpu.a = 0x09;
    cpu.status.set_decimal(true);
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0x0A);
}

#[test]
fn adc_matches_reference_model() {
    for a in (0..=255u8).step_by(7) {
        for m in (0..=255u8).step_by(11) {
            for c in [false, true] {
                let cpu = adc(a, m, c);
                let sum = a as i16 + m as i16 + c as i16;
                let signed = a as i8 as i16 + m as i8 as i16 + c as i16;
                assert_eq!(cpu.a, sum as u8);
                assert_eq!(cpu.status.carry(), sum > 0xFF);
                assert_eq!(cpu.status.overflow(), !(-128..=127).contains(&signed));
            }
        }
    }
}

#[test]
fn sbc_without_borrow() {
    let cpu = sbc(0x50, 0x10, true);
    assert_eq!(cpu.a, 0x40);
    assert!(cpu.status.carry());
    assert!(!cpu.status.overflow());
}

#[test]
fn sbc_with_borrow_in() {
    let cpu = sbc(0x50, 0x10, false);
    assert_eq!(cpu.a, 0x3F);
    assert!(cpu.status.carry());
}

#[test]
fn sbc_borrow_out() {
    let cpu = sbc(0x00, 0x01, true);
    assert_eq!(cpu.a, 0xFF);
    assert!(!cpu.status.carry());
    assert!(cpu.status.negative());
}

#[test]
fn sbc_signed_overflow() {
    // -128 - 1 = +127 overflow
    let cpu = sbc(0x80, 0x01, true);
    assert_eq!(cpu.a, 0x7F);
    assert!(cpu.status.overflow());
}

#[test]
fn logical_ops() {
    // ORA #$0F ; AND #$3C ; EOR #$FF
    let mut cpu = cpu_with(&[0x09, 0x0F, 0x29, 0x3C, 0x49, 0xFF]);
    cpu.a = 0x30;
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0x3F);
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0x3C);
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0xC3);
    assert!(cpu.status.negative());
}

#[test]
fn and_to_zero() {
    let mut cpu = cpu_with(&[0x29, 0x0F]);
    cpu.a = 0xF0;
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0);
    assert!(cpu.status.zero());
}

#[test]
fn cmp_equal() {
    let mut cpu = cpu_with(&[0xC9, 0x10]);
    cpu.a = 0x10;
    cpu.step().unwrap();
    assert!(cpu.status.carry());
    assert!(cpu.status.zero());
    assert!(!cpu.status.negative());
    assert_eq!(cpu.a, 0x10);
}

#[test]
fn cmp_negative_comes_from_difference_bit7() {
    // A = $01, M = $FF: A < M, but $01 - $FF = $02 has bit 7 clear.
    let mut cpu = cpu_with(&[0xC9, 0xFF]);
    cpu.a = 0x01;
    cpu.step().unwrap();
    assert!(!cpu.status.carry());
    assert!(!cpu.status.zero());
    assert!(!cpu.status.negative());

    // A = $F0, M = $10: A >= M, but $F0 - $10 = $E0 has bit 7 set.
    let mut cpu = cpu_with(&[0xC9, 0x10]);
    cpu.a = 0xF0;
    cpu.step().unwrap();
    assert!(cpu.status.carry());
    assert!(cpu.status.negative());
}

#[test]
fn cpx_cpy() {
    // CPX #$05 ; CPY $20
    let mut cpu = cpu_with(&[0xE0, 0x05, 0xC4, 0x20]);
    cpu.x = 0x04;
    cpu.y = 0x30;
    cpu.memory.data[0x20] = 0x30;
    cpu.step().unwrap();
    assert!(!cpu.status.carry());
    assert!(cpu.status.negative());
    cpu.step().unwrap();
    assert!(cpu.status.carry());
    assert!(cpu.status.zero());
}

#[test]
fn bit_copies_high_bits_and_tests_mask() {
    // BIT $40 ; BIT $1234
    let mut cpu = cpu_with(&[0x24, 0x40, 0x2C, 0x34, 0x12]);
    cpu.a = 0x01;
    cpu.memory.data[0x40] = 0xC0;
    cpu.memory.data[0x1234] = 0x01;
    cpu.step().unwrap();
    assert!(cpu.status.zero());
    assert!(cpu.status.overflow());
    assert!(cpu.status.negative());
    assert_eq!(cpu.step(), Ok(4));
    assert!(!cpu.status.zero());
    assert!(!cpu.status.overflow());
    assert!(!cpu.status.negative());
    assert_eq!(cpu.a, 0x01);
}
