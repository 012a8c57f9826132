use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use afuc_rs::{decode, fmt_decoded, lift, Firmware, Generation};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Print the disassembly and lifted IR of an AFUC firmware image"
)]
struct Opts {
    /// Override the generation detected from the firmware id (5, 6, 7 or a6xx style)
    #[arg(long = "gen", value_name = "GEN")]
    generation: Option<Generation>,
    /// First code address (hex or dec)
    #[arg(long, value_parser = parse_u32)]
    start: Option<u32>,
    /// End code address, exclusive (hex or dec)
    #[arg(long, value_parser = parse_u32)]
    end: Option<u32>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(value_name = "BINFILE")]
    input: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct Row {
    addr: u32,
    raw: u32,
    text: String,
    il: Vec<afuc_rs::il::Stmt>,
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let bytes = std::fs::read(&opts.input)?;
    let mut fw = Firmware::parse(&bytes)?;
    if let Some(gen) = opts.generation {
        fw = fw.with_generation(gen);
    }
    let gen = fw.generation;

    let start = opts.start.unwrap_or(0);
    let end = opts.end.unwrap_or(fw.len() as u32);
    anyhow::ensure!(end >= start, "end must be >= start");

    let code = fw.code();
    let mut rows = Vec::new();
    let mut pc = start;
    while pc < end {
        let Some(window) = code.get(pc as usize..) else { break };
        let Ok(d) = decode(window, pc, gen) else { break };
        rows.push(Row { addr: pc, raw: d.raw, text: fmt_decoded(&d, pc, gen), il: lift(&d, pc, gen) });
        pc = pc.wrapping_add(4);
    }

    match opts.format {
        OutputFormat::Text => {
            println!("; fw_id {:#05x}, {gen}", fw.fw_id);
            for r in &rows {
                println!("{:08x}: {:08x}  {}", r.addr, r.raw, r.text);
                for s in &r.il {
                    println!("{:22}{s}", "");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}
