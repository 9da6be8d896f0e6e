use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use popgrowth::{Dataset, Region, charts, server, stats, storage, viz};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "popgrowth",
    version,
    about = "Serve & render the population birth rate, death rate, and net growth dashboard"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard page over HTTP.
    Serve(ServeArgs),
    /// Write one chart as SVG or Plotly JSON (format from the file extension).
    Render(RenderArgs),
    /// Print per-region summary statistics.
    Stats(DataArgs),
}

#[derive(Args, Debug)]
struct DataArgs {
    /// CSV with columns country, lon, lat, birth_rate, death_rate, pop_growth, map_ref.
    #[arg(long, default_value = "data/country_data_master.csv")]
    data: PathBuf,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,
    /// Port to bind.
    #[arg(long, default_value_t = 8050)]
    port: u16,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChartKind {
    Bar,
    Map,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Which chart to render.
    #[arg(long, value_enum, default_value_t = ChartKind::Bar)]
    chart: ChartKind,
    /// Output path (.svg or .json).
    #[arg(long)]
    out: PathBuf,
    /// Region to highlight (bar chart only), e.g. "Europe".
    #[arg(long)]
    region: Option<String>,
    /// Countries to highlight, separated by semicolons (bar chart only).
    #[arg(long)]
    countries: Option<String>,
    /// Width of the SVG (default 1200).
    #[arg(long, default_value_t = 1200)]
    width: u32,
    /// Height of the SVG (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
}

// Country names contain commas ("Korea, South"), so only ';' separates.
fn parse_list(s: &str) -> Vec<String> {
    s.split(';')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn load(path: &Path) -> Result<Dataset> {
    storage::load_csv(path).with_context(|| format!("cannot load dataset {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Render(args) => cmd_render(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn cmd_serve(args: ServeArgs) -> Result<()> {
    let dataset = Arc::new(load(&args.data.data)?);
    let addr = SocketAddr::new(args.host, args.port);
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(server::start_server(dataset, addr))
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let dataset = load(&args.data.data)?;
    let figure = match args.chart {
        ChartKind::Bar => {
            let label = args.region.as_deref().unwrap_or("").trim();
            let region = Region::from_label(label);
            if region.is_none() && !label.is_empty() {
                log::warn!("region {label:?} is not known; no region will be highlighted");
            }
            let countries = args.countries.as_deref().map(parse_list).unwrap_or_default();
            for c in &countries {
                if dataset.get(c).is_none() {
                    log::warn!("country {c:?} is not in the dataset; it will not be highlighted");
                }
            }
            charts::derive_bar_chart(&dataset, region, &countries)
        }
        ChartKind::Map => charts::map_figure(&dataset),
    };

    let ext = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("svg")
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => storage::save_json(&figure, &args.out)?,
        "svg" => {
            let svg = match args.chart {
                ChartKind::Bar => viz::render_bar_svg(&figure, args.width, args.height)?,
                ChartKind::Map => viz::render_map_svg(&figure, args.width, args.height)?,
            };
            std::fs::write(&args.out, svg)
                .with_context(|| format!("cannot write {}", args.out.display()))?;
        }
        other => anyhow::bail!("unsupported output format: {}", other),
    }
    eprintln!("Wrote {} chart to {}", chart_name(args.chart), args.out.display());
    Ok(())
}

fn chart_name(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Bar => "bar",
        ChartKind::Map => "map",
    }
}

fn fmt_num(x: f64) -> String {
    // Up to 2 decimals, trailing zeros and dot trimmed.
    let s = format!("{:.2}", x);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn cmd_stats(args: DataArgs) -> Result<()> {
    let dataset = load(&args.data)?;
    for s in stats::region_summary(&dataset) {
        println!(
            "{}  count={}  births={} deaths={} growth={}%  slowest={} fastest={}",
            s.region,
            s.count,
            fmt_num(s.mean_birth_rate),
            fmt_num(s.mean_death_rate),
            fmt_num(s.mean_growth_percent),
            s.slowest,
            s.fastest
        );
    }
    Ok(())
}
