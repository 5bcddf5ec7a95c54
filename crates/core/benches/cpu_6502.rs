use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emu_core::cpu_6502::{decode, Cpu6502, Memory6502, OPCODE_TABLE};

/// Flat 64 KiB memory with a short arithmetic loop at $8000
struct BenchMemory {
    ram: Vec<u8>,
}

impl BenchMemory {
    fn new() -> Self {
        let mut ram = vec![0; 0x10000];
        ram[0xFFFC] = 0x00;
        ram[0xFFFD] = 0x80;

        let program: &[u8] = &[
            0xA9, 0x42, // LDA #$42
            0x8D, 0x00, 0x02, // STA $0200
            0xA2, 0x10, // LDX #$10
            0xA0, 0x20, // LDY #$20
            0xE8, // INX
            0xC8, // INY
            0xCA, // DEX
            0x88, // DEY
            0x69, 0x01, // ADC #$01
            0x7D, 0xF0, 0x01, // ADC $01F0,X
            0xC9, 0x80, // CMP #$80
            0xD0, 0x00, // BNE +0
            0x4C, 0x00, 0x80, // JMP $8000
        ];
        ram[0x8000..0x8000 + program.len()].copy_from_slice(program);

        Self { ram }
    }
}

impl Memory6502 for BenchMemory {
    fn read(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.ram[addr as usize] = val;
    }
}

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_step");

    group.bench_function("single_instruction", |b| {
        let mut cpu = Cpu6502::new(BenchMemory::new());
        cpu.reset();
        b.iter(|| {
            let _ = black_box(cpu.step());
        });
    });

    group.finish();
}

fn bench_cpu_multiple_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_multiple_steps");

    for step_count in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(step_count),
            step_count,
            |b, &count| {
                b.iter(|| {
                    let mut cpu = Cpu6502::new(BenchMemory::new());
                    cpu.reset();
                    for _ in 0..count {
                        let _ = cpu.step();
                    }
                    black_box(cpu.cycles);
                });
            },
        );
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_decode");

    group.bench_function("table_lookup", |b| {
        b.iter(|| {
            for op in 0..=255u8 {
                black_box(OPCODE_TABLE[black_box(op) as usize]);
            }
        });
    });

    group.bench_function("bit_field_decode", |b| {
        b.iter(|| {
            for op in 0..=255u8 {
                black_box(decode(black_box(op)));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cpu_step,
    bench_cpu_multiple_steps,
    bench_decode
);
criterion_main!(benches);
