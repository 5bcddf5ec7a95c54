use anyhow::{Context, Result};
use clap::Parser;
use emu_core::logging::{LogCategory, LogConfig, LogLevel};
use emu_core::System;
use emu_nes::{NesConfig, NesSystem};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Per-category messages per second allowed while tracing.
const TRACE_RATE_LIMIT: usize = 100_000;

#[derive(Parser)]
#[command(version, about = "Headless NES CPU runner")]
struct Args {
    /// iNES ROM to load
    rom: PathBuf,

    /// Number of instructions to execute
    #[arg(long, default_value_t = 1000)]
    steps: usize,

    /// JSON machine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat unmapped bus accesses as errors
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Log every executed instruction
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Core log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "warn", value_parser = parse_level)]
    log_level: LogLevel,

    /// Write core logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Dump a JSON save-state here after running
    #[arg(long)]
    save: Option<PathBuf>,
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::from_str(s).ok_or_else(|| format!("unknown log level '{}'", s))
}

fn configure_logging(args: &Args) -> Result<()> {
    let logs = LogConfig::global();
    logs.set_global_level(args.log_level);
    if args.trace {
        logs.set_level(LogCategory::CPU, LogLevel::Trace);
        // Tracing emits one line per instruction.
        logs.set_rate_limit(TRACE_RATE_LIMIT);
    }
    if let Some(path) = &args.log_file {
        logs.set_log_file(path.clone())
            .with_context(|| format!("opening log file {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    configure_logging(&args)?;

    let mut config = match &args.config {
        Some(path) => NesConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NesConfig::default(),
    };
    if args.strict {
        config.strict_bus = true;
    }
    log::debug!("machine config: {:?}", config);

    let mut nes = NesSystem::new(config);
    nes.load_rom_from_path(&args.rom)
        .with_context(|| format!("loading ROM {}", args.rom.display()))?;
    log::info!("loaded {}", args.rom.display());

    let result = nes.run(args.steps);

    let cpu = nes.cpu().core();
    println!(
        "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        cpu.pc,
        cpu.a,
        cpu.x,
        cpu.y,
        cpu.status.bits(),
        cpu.sp,
        cpu.cycles
    );

    if let Some(path) = &args.save {
        let state = nes.save_state();
        let mut f = File::create(path)
            .with_context(|| format!("creating save-state {}", path.display()))?;
        write!(f, "{}", serde_json::to_string_pretty(&state)?)?;
        log::info!("save-state written to {}", path.display());
    }

    LogConfig::global().clear_log_file();

    let cycles = result.context("execution halted")?;
    log::info!("ran {} steps, {} cycles", args.steps, cycles);
    Ok(())
}
