//! Core emulator primitives and traits.

pub mod cpu_6502;
pub mod logging;

use serde_json::Value;

/// A CPU-like component that can be stepped; `step` returns cycles consumed.
pub trait Cpu {
    type Error;

    fn reset(&mut self);
    fn step(&mut self) -> Result<u32, Self::Error>;

    /// Execute at most `budget` instructions, stopping at the first error.
    /// Returns the cycles consumed.
    fn run(&mut self, budget: usize) -> Result<u64, Self::Error> {
        let mut cycles = 0u64;
        for _ in 0..budget {
            cycles += self.step()? as u64;
        }
        Ok(cycles)
    }
}

/// Description of a mount point (media slot) that a system supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPointInfo {
    /// Unique identifier for this mount point (e.g., "Cartridge")
    pub id: String,
    /// User-friendly name for display (e.g., "Cartridge Slot")
    pub name: String,
    /// File extensions accepted by this mount point (e.g., ["nes"])
    pub extensions: Vec<String>,
    /// Whether this mount point is required for the system to function
    pub required: bool,
}

/// A high-level System trait tying components together.
///
/// Hosts drive a system cooperatively: each `step` runs exactly one CPU
/// instruction to completion, and `run` bounds the work done per call so
/// several devices can be interleaved deterministically.
pub trait System {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reset to initial power-on state
    fn reset(&mut self);

    /// Execute one instruction and return the cycles it took.
    fn step(&mut self) -> Result<u32, Self::Error>;

    /// Execute up to `budget` instructions; returns cycles consumed.
    fn run(&mut self, budget: usize) -> Result<u64, Self::Error> {
        let mut cycles = 0u64;
        for _ in 0..budget {
            cycles += self.step()? as u64;
        }
        Ok(cycles)
    }

    /// Return a JSON-serializable save state.
    /// Save states do not include ROM/cartridge data.
    fn save_state(&self) -> Value;

    /// Load a JSON save state.
    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error>;

    /// Check if this system supports save/load state functionality
    fn supports_save_states(&self) -> bool {
        false
    }

    /// Get the list of mount points this system supports
    fn mount_points(&self) -> Vec<MountPointInfo>;

    /// Load media into a specific mount point
    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Unload media from a specific mount point
    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error>;

    /// Check if a mount point has media loaded
    fn is_mounted(&self, mount_point_id: &str) -> bool;
}
