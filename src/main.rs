use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chartspec::api::PreviewRequest;
use chartspec::graph;
use chartspec::recommend::{default_configs, recommend_for};
use chartspec::{compile, ChartInstanceConfig, OutputFormat, RenderOptions, TabularDataset};

#[derive(Parser, Debug)]
#[command(name = "chartspec")]
#[command(version, about = "Compile chart configurations against tabular data into render specs", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile chart configs into render specs (JSON)
    Compile(CompileArgs),
    /// Suggest chart kinds and default configs for a dataset
    Recommend(DataArgs),
    /// Draw preview images of chart configs
    Render(RenderArgs),
    /// Build the image-generation request for chart configs
    Request(RequestArgs),
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Dataset: parser JSON ({columns, data, data_types}) or a .csv file.
    /// The built-in sample dataset is used when omitted.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
    /// Write output to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CompileArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Chart config JSON: one object or an array of objects
    #[arg(long)]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Chart config JSON: one object or an array of objects
    #[arg(long)]
    config: PathBuf,
    /// Render options JSON ({width, height, type}); sized from the data when omitted
    #[arg(long)]
    options: Option<PathBuf>,
    /// Output format when no options file is given
    #[arg(long, default_value = "png", value_parser = parse_format)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Chart config JSON: one object or an array of objects
    #[arg(long)]
    config: PathBuf,
    #[arg(long)]
    access_code: String,
    /// Server-side path of the uploaded spreadsheet
    #[arg(long)]
    file_path: String,
    /// Render options JSON ({width, height, type})
    #[arg(long)]
    options: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Recommend(args) => cmd_recommend(args),
        Command::Render(args) => cmd_render(args),
        Command::Request(args) => cmd_request(args),
    }
}

fn cmd_compile(args: CompileArgs) -> Result<()> {
    let dataset = load_dataset(args.data.data.as_deref())?;
    let (configs, is_array) = load_configs(&args.config)?;

    let specs: Vec<Value> = configs
        .iter()
        .map(|config| compile(config, &dataset).to_json())
        .collect();

    let output = if is_array {
        Value::Array(specs)
    } else {
        specs.into_iter().next().unwrap_or(Value::Null)
    };
    write_json(&output, args.data.pretty, args.data.out.as_deref())
}

fn cmd_recommend(args: DataArgs) -> Result<()> {
    let dataset = load_dataset(args.data.as_deref())?;

    let recommendations: Vec<Value> = recommend_for(&dataset)
        .into_iter()
        .map(|kind| {
            json!({
                "kind": kind,
                "name": kind.display_name(),
                "description": kind.description(),
            })
        })
        .collect();

    let output = json!({
        "recommendations": recommendations,
        "default_configs": default_configs(&dataset),
    });
    write_json(&output, args.pretty, args.out.as_deref())
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let dataset = load_dataset(args.data.data.as_deref())?;
    let (configs, _) = load_configs(&args.config)?;
    let options = load_options(args.options.as_deref())?;

    if configs.len() > 1 && args.data.out.is_none() {
        anyhow::bail!("Rendering several charts requires --out");
    }

    let mut used_names = HashSet::new();
    for (idx, config) in configs.iter().enumerate() {
        let options = options.clone().unwrap_or_else(|| {
            RenderOptions::for_chart(config.chart_kind, dataset.row_count(), args.format)
        });
        let spec = compile(config, &dataset);
        let image = graph::render(&spec, &options)
            .with_context(|| format!("Failed to render chart '{}'", config.id))?;

        match &args.data.out {
            Some(out) => {
                let path = if configs.len() > 1 {
                    let mut name = file_safe_id(&config.id, idx);
                    if !used_names.insert(name.clone()) {
                        name = format!("{}-{}", name, idx + 1);
                        used_names.insert(name.clone());
                    }
                    numbered_path(out, &name, image.format)
                } else {
                    out.clone()
                };
                fs::write(&path, &image.bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("wrote {}", path.display());
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle
                    .write_all(&image.bytes)
                    .context("Failed to write image to stdout")?;
                handle.flush().context("Failed to flush stdout")?;
            }
        }
    }

    Ok(())
}

fn cmd_request(args: RequestArgs) -> Result<()> {
    let (configs, _) = load_configs(&args.config)?;
    let options = load_options(args.options.as_deref())?.unwrap_or_default();
    let request = PreviewRequest::from_configs(args.access_code, args.file_path, &configs, &options);
    write_json(&request, args.pretty, args.out.as_deref())
}

// =============================================================================
// Input / output
// =============================================================================

fn load_dataset(path: Option<&Path>) -> Result<TabularDataset> {
    let Some(path) = path else {
        log::debug!("no --data given, using the sample dataset");
        return Ok(TabularDataset::mock());
    };

    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        TabularDataset::from_csv(file).with_context(|| format!("Failed to read CSV {}", path.display()))
    } else {
        let value = read_json(path)?;
        TabularDataset::from_json(&value).with_context(|| format!("Failed to load dataset {}", path.display()))
    }
}

/// Configs from a file holding one config object or an array of them
fn load_configs(path: &Path) -> Result<(Vec<ChartInstanceConfig>, bool)> {
    let value = read_json(path)?;
    Ok(match value {
        Value::Array(items) => (items.iter().map(ChartInstanceConfig::from_json).collect(), true),
        other => (vec![ChartInstanceConfig::from_json(&other)], false),
    })
}

fn load_options(path: Option<&Path>) -> Result<Option<RenderOptions>> {
    path.map(|p| {
        let value = read_json(p)?;
        serde_json::from_value(value).with_context(|| format!("Invalid render options in {}", p.display()))
    })
    .transpose()
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, pretty: bool, out: Option<&Path>) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;

    match out {
        Some(path) => fs::write(path, text + "\n").with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

/// Chart id reduced to `[A-Za-z0-9_-]`; the 1-based position when nothing is left
fn file_safe_id(chart_id: &str, idx: usize) -> String {
    let safe: String = chart_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if safe.is_empty() {
        format!("chart{}", idx + 1)
    } else {
        safe
    }
}

/// `charts.png` + `sales` -> `charts-sales.png`
fn numbered_path(out: &Path, name: &str, format: OutputFormat) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart".to_string());
    out.with_file_name(format!("{}-{}.{}", stem, name, format.extension()))
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "png" => Ok(OutputFormat::Png),
        "svg" => Ok(OutputFormat::Svg),
        other => Err(format!("unsupported format '{}' (expected png or svg)", other)),
    }
}
