//! `lsys` CLI: compile an L-system program and realize it.

use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use lsys_core::constants::SimpleConstant;
use lsys_core::error::Severity;
use lsys_core::{
    compile_source, optimize_and_apply, realize, CompileOutput, CompilerError, IterationPlan,
    Overrides, Realization, RealizeOptions,
};
use lsys_svg::{render_to_string, RenderOptions};

#[derive(Parser)]
#[command(version, about = "Compile and realize L-system programs")]
struct Cli {
    /// Input file to compile
    file: Option<String>,

    /// Compile this source text instead of reading a file
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Override a constant (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, f64)>,

    /// Draw budget used to pick the iteration count
    #[arg(long, default_value_t = 100_000)]
    budget: u64,

    /// Upper bound for the adaptive iteration count
    #[arg(long, default_value_t = 12)]
    max_iterations: usize,

    /// Use exactly this many iterations instead of picking adaptively
    #[arg(long)]
    iterations: Option<usize>,

    /// Iterations expanded per symbol subtree
    #[arg(long, default_value_t = 5)]
    subtree_iterations: usize,

    /// What to produce: "summary" (default), "svg" or "json"
    #[arg(long, default_value = "summary", value_parser = parse_format)]
    format: Format,

    /// Output directory for SVG and JSON files
    #[arg(short, long, default_value = ".")]
    output: String,

    /// SVG camera yaw in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    view_yaw: f64,

    /// SVG camera pitch in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    view_pitch: f64,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Summary,
    Svg,
    Json,
}

fn parse_format(s: &str) -> Result<Format, String> {
    match s.to_lowercase().as_str() {
        "summary" => Ok(Format::Summary),
        "svg" => Ok(Format::Svg),
        "json" => Ok(Format::Json),
        _ => Err(format!(
            "unknown format \"{s}\": expected \"summary\", \"svg\" or \"json\""
        )),
    }
}

fn parse_override(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got \"{s}\""))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing constant name in \"{s}\""));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name.to_owned(), value))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stem = cli
        .file
        .as_deref()
        .and_then(|f| Path::new(f).file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_owned();

    let source = read_source(&cli);
    let overrides: Overrides = cli.overrides.iter().cloned().collect();

    let compiled = match compile_source(&source, &overrides) {
        Ok(compiled) => compiled,
        Err(diagnostics) => {
            print_diagnostics(&diagnostics);
            process::exit(1);
        }
    };
    print_diagnostics(&compiled.warnings);

    let realization = match realize_with(&cli, &compiled) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    match cli.format {
        Format::Summary => print_summary(&compiled, &realization),
        Format::Svg => {
            let opts = RenderOptions {
                yaw: cli.view_yaw,
                pitch: cli.view_pitch,
                ..RenderOptions::default()
            };
            let svg = render_to_string(&realization, &opts);
            write_file(&cli.output, &format!("{stem}.svg"), &svg);
        }
        Format::Json => {
            let export = Export {
                constants: compiled.simple_constants(),
                realization: &realization,
            };
            match serde_json::to_string_pretty(&export) {
                Ok(json) => write_file(&cli.output, &format!("{stem}.json"), &json),
                Err(e) => {
                    eprintln!("Error: cannot serialize realization: {e}");
                    process::exit(1);
                }
            }
        }
    }
}

fn read_source(cli: &Cli) -> String {
    if let Some(ref src) = cli.eval {
        return src.clone();
    }
    if let Some(ref file) = cli.file {
        match fs::read_to_string(file) {
            Ok(s) => return s,
            Err(e) => {
                eprintln!("Error reading {file}: {e}");
                process::exit(1);
            }
        }
    }
    eprintln!("No input file or source specified");
    process::exit(1);
}

fn realize_with(
    cli: &Cli,
    compiled: &CompileOutput,
) -> Result<Realization, lsys_core::InternError> {
    if let Some(total) = cli.iterations {
        let plan = IterationPlan::split(total, cli.subtree_iterations);
        return optimize_and_apply(&compiled.spec, &compiled.app, plan.main, plan.subtree);
    }
    let options = RealizeOptions {
        draw_budget: cli.budget,
        max_iterations: cli.max_iterations,
        subtree_iterations: cli.subtree_iterations,
    };
    realize(&compiled.spec, &compiled.app, &options)
}

fn print_diagnostics(diagnostics: &[CompilerError]) {
    for d in diagnostics {
        match d.severity {
            Severity::Warning => eprintln!("warning {d}"),
            Severity::Error => eprintln!("error {d}"),
        }
    }
}

fn print_summary(compiled: &CompileOutput, realization: &Realization) {
    let plan = realization.plan;
    println!(
        "iterations: {} (main {}, subtree {})",
        plan.total(),
        plan.main,
        plan.subtree
    );

    let constants = compiled.simple_constants();
    if !constants.is_empty() {
        println!("constants:");
        for c in &constants {
            let value = compiled.constants.get(&c.name).unwrap_or(c.value);
            println!("  {} = {value} (default {})", c.name, c.value);
        }
    }

    for s in &realization.symbols {
        println!(
            "symbol {}: {} anchors x {} draws = {}",
            s.symbol,
            s.anchors.len(),
            s.subtree.placements.len(),
            s.instance_count()
        );
    }
    println!("instances: {}", realization.instance_count());

    let bounds = realization.bounds();
    if bounds.is_valid() {
        let size = bounds.size();
        println!("extent: {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
    }
}

#[derive(Serialize)]
struct Export<'a> {
    constants: Vec<SimpleConstant>,
    #[serde(flatten)]
    realization: &'a Realization,
}

fn write_file(output_dir: &str, filename: &str, content: &str) {
    let path = Path::new(output_dir).join(filename);
    match fs::write(&path, content) {
        Ok(()) => {
            eprintln!("Wrote {}", path.display());
        }
        Err(e) => {
            eprintln!("Error writing {}: {e}", path.display());
            process::exit(1);
        }
    }
}
