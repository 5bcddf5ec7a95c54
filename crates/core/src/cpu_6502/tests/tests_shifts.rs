//! Shift, rotate, increment and decrement tests

use super::cpu_with;

#[test]
fn asl_accumulator() {
    let mut cpu = cpu_with(&[0x0A]);
    cpu.a = 0x81;
    assert_eq!(cpu.step(), Ok(2));
    assert_eq!(cpu.a, 0x02);
    assert!(cpu.status.carry());
    assert!(!cpu.status.negative());
}

#[test]
fn asl_memory_to_zero() {
    let mut cpu = cpu_with(&[0x06, 0x10]);
    cpu.memory.data[0x10] = 0x80;
    assert_eq!(cpu.step(), Ok(5));
    assert_eq!(cpu.memory.data[0x10], 0x00);
    assert!(cpu.status.carry());
    assert!(cpu.status.zero());
}

#[test]
fn lsr_sets_zero_from_result() {
    let mut cpu = cpu_with(&[0x4A]);
    cpu.a = 0x01;
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.status.carry());
    assert!(cpu.status.zero());
    assert!(!cpu.status.negative());
}

#[test]
fn rol_folds_carry_into_bit0() {
    let mut cpu = cpu_with(&[0x2A]);
    cpu.a = 0x40;
    cpu.status.set_carry(true);
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0x81);
    assert!(!cpu.status.carry());
    assert!(cpu.status.negative());
}

#[test]
fn ror_folds_carry_into_bit7() {
    let mut cpu = cpu_with(&[0x6A, 0x6A]);
    cpu.a = 0x01;
    cpu.status.set_carry(true);
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.status.carry());
    assert!(cpu.status.negative());
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0xC0);
    assert!(!cpu.status.carry());
}

#[test]
fn ror_absolute_x() {
    let mut cpu = cpu_with(&[0x7E, 0x00, 0x03]);
    cpu.x = 0x04;
    cpu.memory.data[0x0304] = 0x02;
    assert_eq!(cpu.step(), Ok(7));
    assert_eq!(cpu.memory.data[0x0304], 0x01);
    assert!(!cpu.status.carry());
}

#[test]
fn inc_dec_memory_wrap() {
    // INC $20 ; DEC $21
    let mut cpu = cpu_with(&[0xE6, 0x20, 0xC6, 0x21]);
    cpu.memory.data[0x20] = 0xFF;
    cpu.memory.data[0x21] = 0x00;
    assert_eq!(cpu.step(), Ok(5));
    assert_eq!(cpu.memory.data[0x20], 0x00);
    assert!(cpu.status.zero());
    cpu.step().unwrap();
    assert_eq!(cpu.memory.data[0x21], 0xFF);
    assert!(cpu.status.negative());
}

#[test]
fn register_increments_wrap() {
    // INX ; INY ; DEX ; DEY
    let mut cpu = cpu_with(&[0xE8, 0xC8, 0xCA, 0x88]);
    cpu.x = 0xFF;
    cpu.y = 0x7F;
    cpu.step().unwrap();
    assert_eq!(cpu.x, 0x00);
    assert!(cpu.status.zero());
    cpu.step().unwrap();
    assert_eq!(cpu.y, 0x80);
    assert!(cpu.status.negative());
    cpu.step().unwrap();
    assert_eq!(cpu.x, 0xFF);
    cpu.step().unwrap();
    assert_eq!(cpu.y, 0x7F);
    assert!(!cpu.status.negative());
}

#[test]
fn read_modify_write_has_no_page_cross_penalty() {
    // ASL $12F0,X crossing into $13xx
    let mut cpu = cpu_with(&[0x1E, 0xF0, 0x12]);
    cpu.x = 0x20;
    cpu.memory.data[0x1310] = 0x41;
    assert_eq!(cpu.step(), Ok(7));
    assert_eq!(cpu.memory.data[0x1310], 0x82);
}
