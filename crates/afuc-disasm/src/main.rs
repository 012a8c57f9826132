use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use std::fmt::Write as _;
use std::path::Path;

use afuc_rs::decoder::Decoder;
use afuc_rs::disasm::fmt_decoded;
use afuc_rs::{AfucDecoder, Generation};

use afuc_disasm::{analyze_entries, build_report, load_firmware, read_u32, Image, Report};

#[derive(Parser, Debug)]
#[command(author, version, about = "AFUC firmware disassembler CLI", long_about=None)]
struct Cli {
    /// Force a GPU generation instead of detecting it from the firmware id
    #[arg(long = "gen", value_name = "GEN", global = true)]
    generation: Option<Generation>,
    /// Firmware image path
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Firmware id, generation and size
    Info,
    /// Disassemble a range [start, end) of code addresses
    Range {
        /// Start address (hex or dec)
        start: String,
        /// End address (hex or dec, exclusive)
        end: String,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Analyze code graph from entry points
    Analyze {
        /// Entry addresses (hex or dec). Repeat flag to add multiple entries.
        #[arg(long = "entry", value_name = "ADDR", num_args = 1.., required = false)]
        entries: Vec<String>,
        /// Maximum instructions to decode before stopping
        #[arg(long, default_value_t = 100_000usize)]
        max_instr: usize,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Emit a linear disassembly listing of analyzed code (text format only)
        #[arg(long)]
        listing: bool,
        /// Write analysis output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Clone, serde::Serialize)]
struct BlockOut { start: u32, end: u32, insns: Vec<String> }

/// One listing line, or `None` past the end of the image.
fn render(img: &Image, dec: &AfucDecoder, pc: u32, show_bytes: bool) -> Option<String> {
    let raw32 = read_u32(img, pc)?;
    let d = dec.decode(raw32);
    let text = fmt_decoded(&d, pc, img.generation);
    Some(if show_bytes {
        let mut s = format!("{pc:#010x}: ");
        for b in raw32.to_le_bytes() { let _ = write!(s, "{b:02x} "); }
        let _ = write!(s, "  {text}");
        s
    } else {
        format!("{pc:#010x}: {text}")
    })
}

fn emit(out: Option<String>, text: &str) -> Result<()> {
    if let Some(path) = out { std::fs::write(path, text)?; } else { print!("{text}"); }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let img = load_firmware(Path::new(&cli.input), cli.generation)?;
    let dec = AfucDecoder::new(img.generation);

    match cli.cmd {
        Command::Info => {
            let size: usize = img.segments.iter().map(|s| s.bytes.len()).sum();
            println!("fw_id      : {:#05x}", img.fw_id);
            println!("generation : {}", img.generation);
            println!("code size  : {size} bytes ({} instructions)", size / 4);
            println!("{:<10} {:<12} {:<12} {:<6} {:<6}", "name", "start", "end", "perms", "kind");
            for s in &img.segments {
                let start = s.base;
                let end = s.base + (s.bytes.len() as u32);
                println!("{:<10} {start:#010x}   {end:#010x}   {:<6} {:<6}", s.name, s.perms, s.kind);
            }
        }
        Command::Range { start, end, show_bytes, out } => {
            let start = parse_u32(&start)?;
            let end = parse_u32(&end)?;
            anyhow::ensure!(end >= start, "end must be >= start");

            let mut buf = String::new();
            let mut pc = start;
            while pc < end {
                let Some(line) = render(&img, &dec, pc, show_bytes) else {
                    let _ = writeln!(buf, "{pc:#010x}: <oob>");
                    break;
                };
                let _ = writeln!(buf, "{line}");
                pc = pc.wrapping_add(4);
            }
            emit(out, &buf)?;
        }
        Command::Analyze { entries, max_instr, format, listing, out } => {
            // default seed: the reset vector at 0
            let mut seeds: Vec<u32> = if entries.is_empty() {
                vec![0]
            } else {
                entries.iter().map(|e| parse_u32(e)).collect::<Result<_>>()?
            };
            seeds.sort_unstable();
            seeds.dedup();
            let analysis = analyze_entries(&img, &seeds, max_instr);
            let report = build_report(&seeds, &analysis);

            match format {
                OutputFormat::Json => {
                    let blocks: Vec<BlockOut> = report
                        .blocks
                        .iter()
                        .map(|b| {
                            let insns = (b.start..b.end)
                                .step_by(4)
                                .filter_map(|pc| render(&img, &dec, pc, false))
                                .collect();
                            BlockOut { start: b.start, end: b.end, insns }
                        })
                        .collect();
                    let report = Report {
                        entries: report.entries,
                        blocks,
                        edges: report.edges,
                        functions: report.functions,
                    };
                    let json = serde_json::to_string_pretty(&report)?;
                    emit(out, &format!("{json}\n"))?;
                }
                OutputFormat::Text => {
                    let mut buf = String::new();
                    let _ = writeln!(buf, "Analysis summary:");
                    let _ = writeln!(buf, "  entries   : {:?}", seeds.iter().map(|a| format!("{a:#010x}")).collect::<Vec<_>>());
                    let _ = writeln!(buf, "  insts     : {}", analysis.visited.len());
                    let _ = writeln!(buf, "  blocks    : {}", report.blocks.len());
                    let _ = writeln!(buf, "  edges     : {}", report.edges.len());
                    let _ = writeln!(buf, "  functions : {}", report.functions.len());
                    let _ = writeln!(buf, "  returns   : {}", analysis.rets.len());
                    let _ = writeln!(buf, "Edges:");
                    for e in &report.edges {
                        let _ = writeln!(buf, "  {:#010x} -> {:#010x} ({})", e.from, e.to, e.kind);
                    }
                    if listing {
                        let fn_entries: Vec<u32> = report.functions.iter().map(|f| f.entry).collect();
                        let block_starts: Vec<u32> = report.blocks.iter().map(|b| b.start).collect();
                        let _ = writeln!(buf, "\nListing (analyzed PCs):");
                        for &pc in &analysis.visited {
                            if fn_entries.contains(&pc) {
                                let _ = writeln!(buf, "{pc:#010x} <sub_{pc:08x}>:");
                            } else if block_starts.contains(&pc) {
                                let _ = writeln!(buf, "{pc:#010x} <loc_{pc:08x}>:");
                            }
                            if let Some(line) = render(&img, &dec, pc, false) {
                                let _ = writeln!(buf, "  {line}");
                            }
                        }
                    }
                    emit(out, &buf)?;
                }
            }
        }
    }

    Ok(())
}
