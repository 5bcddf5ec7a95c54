//! NES CPU wrapper around the reusable 6502 core

use crate::bus::NesBus;
use crate::NesError;
use emu_core::cpu_6502::{Cpu6502, CpuState, Memory6502, STACK_BASE};

/// Most bytes one instruction pushes (BRK: return address and status)
const MAX_PUSHES: u8 = 3;

/// 6502 wired to the NES bus. A bus fault recorded during an instruction
/// is reported as the instruction's error and rolls back the registers and
/// any stack bytes the instruction pushed.
#[derive(Debug)]
pub struct NesCpu {
    cpu: Cpu6502<NesBus>,
}

impl NesCpu {
    pub fn new(bus: NesBus) -> Self {
        Self {
            cpu: Cpu6502::new(bus),
        }
    }

    pub fn reset(&mut self) {
        // A fault raised while fetching the vector is stale after reset.
        self.cpu.reset();
        let _ = self.cpu.memory.take_fault();
    }

    /// Execute one instruction
    pub fn step(&mut self) -> Result<u32, NesError> {
        let before = self.cpu.state();
        let stack = self.stack_below(before.sp);
        let cycles = self.cpu.step()?;
        if let Some(fault) = self.cpu.memory.take_fault() {
            self.cpu.restore(&before);
            for (i, byte) in stack.into_iter().enumerate() {
                let addr = STACK_BASE | before.sp.wrapping_sub(i as u8) as u16;
                self.cpu.memory.write(addr, byte);
            }
            return Err(fault.into());
        }
        Ok(cycles)
    }

    /// The stack slots an instruction could push into, top first
    fn stack_below(&self, sp: u8) -> [u8; MAX_PUSHES as usize] {
        let mut bytes = [0; MAX_PUSHES as usize];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.cpu.memory.read(STACK_BASE | sp.wrapping_sub(i as u8) as u16);
        }
        bytes
    }

    pub fn trigger_nmi(&mut self) {
        self.cpu.trigger_nmi();
    }

    pub fn trigger_irq(&mut self) {
        self.cpu.trigger_irq();
    }

    pub fn bus(&self) -> &NesBus {
        &self.cpu.memory
    }

    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.cpu.memory
    }

    /// The underlying 6502, for register access
    pub fn core(&self) -> &Cpu6502<NesBus> {
        &self.cpu
    }

    pub fn core_mut(&mut self) -> &mut Cpu6502<NesBus> {
        &mut self.cpu
    }

    pub fn state(&self) -> CpuState {
        self.cpu.state()
    }

    pub fn restore(&mut self, state: &CpuState) {
        self.cpu.restore(state);
    }
}

impl Default for NesCpu {
    fn default() -> Self {
        Self::new(NesBus::default())
    }
}
