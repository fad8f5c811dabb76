//! fpd-runner: headless launcher for the FPD risk monitor.
//!
//! Usage:
//!   fpd-runner --data-dir ./data --export-dir ./out
//!   fpd-runner --extract extract.csv --config monitor.json --region Norte --report report.json
//!   fpd-runner --extract extract.xlsx --ipc-mode

use anyhow::Result;
use fpd_core::{
    config::MonitorConfig,
    engine::{FpdMonitor, MonitorReport},
    export::write_export_csv,
    filter::FilterSelection,
    source::locate_source,
    store::ExtractCache,
};
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Report {
        #[serde(default)]
        selection: FilterSelection,
    },
    Clock,
    Reload,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or(".");
    let config = match flag_value(&args, "--config") {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };
    let extract: PathBuf = match flag_value(&args, "--extract") {
        Some(path) => PathBuf::from(path),
        None => locate_source(Path::new(data_dir), &config.source_candidates)?,
    };
    let selection = FilterSelection::default()
        .with_branches(flag_values(&args, "--branch"))
        .with_regions(flag_values(&args, "--region"))
        .with_products(flag_values(&args, "--product"))
        .with_client_types(flag_values(&args, "--client-type"));

    let mut cache = ExtractCache::new();

    if ipc_mode {
        return run_ipc_loop(&mut cache, &extract, &config);
    }

    println!("FPD monitor: fpd-runner");
    println!("  extract:       {}", extract.display());
    println!("  maturity lag:  {}", config.maturity_lag);
    println!("  window:        {}", config.window_size);
    println!("  min sample:    {}", config.min_sample);
    println!();

    let dataset = cache.load(&extract, &config)?;
    let monitor = FpdMonitor::new(dataset, config);
    let report = monitor.report(&selection);
    print_summary(&report);

    if let Some(path) = flag_value(&args, "--report") {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, &report)?;
        println!("  report written to {path}");
    }

    if let Some(dir) = flag_value(&args, "--export-dir") {
        match &report.export.summary.file_name {
            Some(name) => {
                let path = Path::new(dir).join(name);
                write_export_csv(BufWriter::new(File::create(&path)?), &report.export.rows)?;
                println!("  export written to {}", path.display());
            }
            None => log::warn!("No export target cohort; nothing written"),
        }
    }

    Ok(())
}

fn run_ipc_loop(cache: &mut ExtractCache, extract: &Path, config: &MonitorConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut monitor = FpdMonitor::new(cache.load(extract, config)?, config.clone());

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Report { selection } => {
                let report = monitor.report(&selection);
                writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
            }
            IpcCommand::Clock => {
                writeln!(stdout, "{}", serde_json::to_string(&monitor.clock.snapshot())?)?;
            }
            IpcCommand::Reload => {
                // The cache only re-reads when the file signature changed.
                monitor = FpdMonitor::new(cache.load(extract, config)?, config.clone());
                writeln!(stdout, "{}", serde_json::to_string(&monitor.clock.snapshot())?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(report: &MonitorReport) {
    let clock = &report.clock;
    println!("=== COHORTS ===");
    println!("  all:       {}", clock.all_cohorts.len());
    println!("  mature:    {}", clock.mature_cohorts.len());
    println!("  current:   {}", clock.current_cohort.as_deref().unwrap_or("-"));
    println!("  previous:  {}", clock.previous_cohort.as_deref().unwrap_or("-"));
    println!("  next:      {}", clock.next_cohort.as_deref().unwrap_or("-"));
    println!("  records:   {} of {}", report.records_selected, report.records_total);

    println!();
    println!("=== WORST BRANCHES ===");
    match &report.panel.ranking {
        Some(ranking) => {
            for g in &ranking.worst {
                println!("  {:<40} {:>6.2}%  ({} of {})", g.label(), g.mean * 100.0, g.sum, g.count);
            }
        }
        None => println!("  (Not enough data for a ranking)"),
    }

    if let Some(pareto) = &report.insights.pareto {
        println!();
        println!("=== CONCENTRATION ===");
        println!(
            "  {} of {} branches ({:.1}%) hold {:.0}% of {} defaults",
            pareto.cutoff_branches,
            pareto.entries.len(),
            pareto.cutoff_ratio * 100.0,
            pareto.threshold * 100.0,
            pareto.total_defaults
        );
    }

    println!();
    println!("=== EXPORT ===");
    let export = &report.export.summary;
    println!("  target:    {}", export.cohort.as_deref().unwrap_or("-"));
    println!("  rows:      {}", export.exported);
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn flag_values<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .collect()
}
