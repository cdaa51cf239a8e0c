use anyhow::{Context, Result};
use binutils::{clap, verbose};
use clap::Parser;
use mips_sim::{mem_print, parse_literal, reg_print, CpuSim, Image, MachineConfig, SeqSim};

// Single cycle MIPS simulator written in rust
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    styles = binutils::get_styles(),
    arg_required_else_help = true,
)]
struct Args {
    /// Path to the instruction image (one hex word per line)
    input: String,

    /// Number of cycles to simulate
    #[arg(short = 'n', long, default_value_t = 500)]
    cycles: u64,

    /// Size of the data memory in words (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_words)]
    dmem_words: Option<usize>,

    /// Optional data memory image, loaded at address 0 before the run
    #[arg(long)]
    dmem: Option<String>,

    /// Print a summary of every cycle
    #[arg(long)]
    trace: bool,

    /// Write logs to this file as JSON lines instead of stderr
    #[arg(long)]
    log_file: Option<String>,

    #[command(flatten)]
    verbose: verbose::Verbosity,
}

fn parse_words(s: &str) -> Result<usize, String> {
    parse_literal(s)
        .map(|v| v as usize)
        .ok_or_else(|| format!("`{s}` is not a number"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose.log_level() {
        Some(verbose::Level::Error) => &tracing::Level::WARN,
        Some(verbose::Level::Warn) => &tracing::Level::INFO,
        Some(verbose::Level::Info) => &tracing::Level::DEBUG,
        Some(verbose::Level::Debug) => &tracing::Level::TRACE,
        Some(verbose::Level::Trace) => &tracing::Level::TRACE,
        None => &tracing::Level::ERROR,
    };
    let log_file = match &args.log_file {
        Some(path) => Some(
            std::fs::File::create(path)
                .with_context(|| format!("could not create log file `{}`", path))?,
        ),
        None => None,
    };
    binutils::logging_setup(log_level, log_file.as_ref());

    let image = Image::load(&args.input)
        .with_context(|| format!("could not load image `{}`", &args.input))?;

    if args.trace {
        eprint!("{}", image);
    }

    let mut config = MachineConfig::default().set_tty_out(args.trace);
    if let Some(words) = args.dmem_words {
        config = config.set_dmem_words(words);
    }

    let mut sim = SeqSim::new(&image, config).context("could not build machine")?;
    if let Some(path) = &args.dmem {
        let data =
            Image::load(path).with_context(|| format!("could not load data image `{}`", path))?;
        sim.seed_memory(&data)
            .with_context(|| format!("could not seed data memory from `{}`", path))?;
    }
    let initial = sim.mem().to_vec();

    let result = sim.run(args.cycles);

    println!("cycles: {}  pc: {:#x}", sim.cycle_count(), sim.program_counter());
    if sim.unsupported_count() > 0 {
        println!("unsupported instructions skipped: {}", sim.unsupported_count());
    }
    println!("registers:");
    reg_print(&sim.registers());
    println!("data memory:");
    if args.dmem.is_some() {
        mips_sim::mem_diff(&initial, sim.mem());
    } else {
        mem_print(sim.mem());
    }

    result.with_context(|| format!("simulation halted at pc {:#x}", sim.program_counter()))?;
    Ok(())
}
