#![deny(missing_docs)]

//! Command-line entry point: hand label a JSON Lines table at the terminal.

use std::path::{Path, PathBuf};

use handlabel::config::{self, SessionSettings};
use handlabel::labeling::{
    ConsistencyReport, ConsoleOracle, HandLabelSession, LabelType, RunOutcome, RunPolicy,
};
use handlabel::logging;
use handlabel::table::Table;
use handlabel::table::io::{load_jsonl, write_jsonl};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init(options.verbose) {
        eprintln!("Logging disabled: {err}");
    }
    let settings = match &options.config_path {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    let resolved = options.resolve(&settings);

    let mut table = load_jsonl(&options.input)
        .map_err(|err| format!("Failed to read {}: {err}", options.input.display()))?;
    tracing::info!(
        "Loaded {} row(s) with columns [{}] from {}",
        table.row_count(),
        table.columns().join(", "),
        options.input.display()
    );

    let oracle = ConsoleOracle::stdio();
    let mut session = match options.label_type {
        Some(label_type) => HandLabelSession::with_label_type(oracle, label_type),
        None => HandLabelSession::new(oracle),
    };

    let out_path = options
        .out
        .clone()
        .unwrap_or_else(|| default_out_path(&options.input));
    if !options.check {
        let labeled = session
            .hand_label(&mut table, &options.label_column, &resolved.feature_columns)
            .map_err(|err| err.to_string())?;
        write_table(&table, &out_path)?;
        println!("Labeled {} row(s); wrote {}", labeled.len(), out_path.display());
        return Ok(());
    }

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let result = session.run_until_consistent_with_rng(
        &mut table,
        &options.label_column,
        resolved.policy,
        &resolved.feature_columns,
        resolved.sample_fraction,
        &mut rng,
    );
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            let hand_labeled = session.hand_labeled().len();
            return Err(save_partial(&table, hand_labeled, &out_path, err));
        }
    };
    write_table(&table, &out_path)?;
    print_summary(&outcome, session.hand_labeled().len(), &out_path);
    if let Some(report_path) = &options.report {
        write_report(report_path, &outcome)?;
    }
    Ok(())
}

fn write_table(table: &Table, out_path: &Path) -> Result<(), String> {
    write_jsonl(table, out_path)
        .map_err(|err| format!("Failed to write {}: {err}", out_path.display()))
}

/// Keep rows the operator already labeled when a later step fails.
fn save_partial(
    table: &Table,
    hand_labeled: usize,
    out_path: &Path,
    err: impl std::fmt::Display,
) -> String {
    if hand_labeled == 0 {
        return err.to_string();
    }
    match write_table(table, out_path) {
        Ok(()) => {
            tracing::warn!("Run failed after labeling {hand_labeled} row(s): {err}");
            format!(
                "{err}\nSaved {hand_labeled} hand-labeled row(s) to {}",
                out_path.display()
            )
        }
        Err(write_err) => format!("{err}\n{write_err}"),
    }
}

fn print_summary(outcome: &RunOutcome, hand_labeled: usize, out_path: &Path) {
    println!();
    println!("Hand labeled {hand_labeled} row(s); wrote {}", out_path.display());
    for (pass, report) in outcome.reports.iter().enumerate() {
        println!(
            "pass {:>2}: {}/{} agree ({:.1}%)",
            pass + 1,
            report.agreement_count,
            report.sample_size,
            report.agreement_ratio * 100.0
        );
        for disagreement in &report.disagreements {
            println!(
                "  row {}: recorded {:?}, relabeled {:?}",
                disagreement.row, disagreement.original, disagreement.relabeled
            );
        }
    }
    println!("status: {}", outcome.status.as_str());
}

#[derive(Serialize)]
struct ReportFile<'a> {
    status: &'static str,
    passes: &'a [ConsistencyReport],
}

fn write_report(path: &Path, outcome: &RunOutcome) -> Result<(), String> {
    let report = ReportFile {
        status: outcome.status.as_str(),
        passes: &outcome.reports,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("Failed to encode report: {err}"))?;
    std::fs::write(path, json)
        .map_err(|err| format!("Failed to write report {}: {err}", path.display()))
}

fn default_out_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    input.with_file_name(format!("{stem}.labeled.jsonl"))
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    input: PathBuf,
    label_column: String,
    out: Option<PathBuf>,
    report: Option<PathBuf>,
    config_path: Option<PathBuf>,
    columns: Option<Vec<String>>,
    label_type: Option<LabelType>,
    sample_fraction: Option<f64>,
    min_passes: Option<u32>,
    max_passes: Option<u32>,
    seed: Option<u64>,
    check: bool,
    verbose: bool,
}

/// Settings after command-line overrides are applied to the config file.
#[derive(Debug, Clone, PartialEq)]
struct ResolvedRun {
    feature_columns: Vec<String>,
    sample_fraction: f64,
    policy: RunPolicy,
}

impl CliOptions {
    fn resolve(&self, settings: &SessionSettings) -> ResolvedRun {
        let min_passes = self.min_passes.unwrap_or(settings.min_passes);
        let max_passes = self.max_passes.unwrap_or(settings.max_passes);
        ResolvedRun {
            feature_columns: self
                .columns
                .clone()
                .unwrap_or_else(|| settings.feature_columns.clone()),
            sample_fraction: self.sample_fraction.unwrap_or(settings.sample_fraction),
            policy: RunPolicy::new(min_passes, max_passes.max(min_passes)),
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>, String> {
    let mut input: Option<PathBuf> = None;
    let mut label_column: Option<String> = None;
    let mut out = None;
    let mut report = None;
    let mut config_path = None;
    let mut columns = None;
    let mut label_type = None;
    let mut sample_fraction = None;
    let mut min_passes = None;
    let mut max_passes = None;
    let mut seed = None;
    let mut check = true;
    let mut verbose = false;

    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--no-check" => check = false,
            "-v" | "--verbose" => verbose = true,
            _ => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| match flag {
                        "--input" | "--label-column" | "--out" | "--report" | "--config"
                        | "--columns" | "--label-type" | "--sample-fraction" | "--min-passes"
                        | "--max-passes" | "--seed" => format!("{flag} requires a value"),
                        unknown => format!("Unknown argument: {unknown}\n\n{}", help_text()),
                    })?;
                match flag {
                    "--input" => input = Some(PathBuf::from(value)),
                    "--label-column" => label_column = Some(value.to_string()),
                    "--out" => out = Some(PathBuf::from(value)),
                    "--report" => report = Some(PathBuf::from(value)),
                    "--config" => config_path = Some(PathBuf::from(value)),
                    "--columns" => columns = Some(parse_columns(value)),
                    "--label-type" => {
                        label_type = Some(LabelType::parse(value).map_err(|err| err.to_string())?)
                    }
                    "--sample-fraction" => {
                        sample_fraction = Some(
                            value
                                .parse::<f64>()
                                .map_err(|_| format!("Invalid --sample-fraction value: {value}"))?,
                        )
                    }
                    "--min-passes" => {
                        min_passes = Some(
                            value
                                .parse::<u32>()
                                .map_err(|_| format!("Invalid --min-passes value: {value}"))?,
                        )
                    }
                    "--max-passes" => {
                        max_passes = Some(
                            value
                                .parse::<u32>()
                                .map_err(|_| format!("Invalid --max-passes value: {value}"))?,
                        )
                    }
                    "--seed" => {
                        seed = Some(
                            value
                                .parse::<u64>()
                                .map_err(|_| format!("Invalid --seed value: {value}"))?,
                        )
                    }
                    unknown => {
                        return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
                    }
                }
            }
        }
        idx += 1;
    }

    let input = input.ok_or_else(|| format!("--input is required\n\n{}", help_text()))?;
    let label_column =
        label_column.ok_or_else(|| format!("--label-column is required\n\n{}", help_text()))?;
    Ok(Some(CliOptions {
        input,
        label_column,
        out,
        report,
        config_path,
        columns,
        label_type,
        sample_fraction,
        min_passes,
        max_passes,
        seed,
        check,
        verbose,
    }))
}

fn parse_columns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_string)
        .collect()
}

fn help_text() -> String {
    [
        "handlabel",
        "",
        "Prompts for labels of rows whose label column is null, then re-checks",
        "a random sample of the new labels blind until they agree.",
        "",
        "Usage:",
        "  handlabel --input <file.jsonl> --label-column <name> [options]",
        "",
        "Options:",
        "  --input <file>           JSON Lines table, one object per row (required).",
        "  --label-column <name>    Column holding the labels (required).",
        "  --out <file>             Output table (default: <input>.labeled.jsonl).",
        "  --columns <a,b,...>      Feature columns to show (default: all but the label).",
        "  --label-type <type>      string, integer or float (default: ask).",
        "  --sample-fraction <f64>  Share of labeled rows re-checked (default: 0.3).",
        "  --min-passes <n>         Passes before a perfect check may stop (default: 1).",
        "  --max-passes <n>         Upper bound on passes (default: 5).",
        "  --no-check               Label once without consistency checks.",
        "  --seed <u64>             Seed for the consistency sample.",
        "  --report <file>          Write consistency reports as JSON.",
        "  --config <file>          Settings file (default: app config.toml).",
        "  -v, --verbose            Show debug logging on stderr.",
    ]
    .join("\n")
}
