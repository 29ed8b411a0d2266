//!
//! This binary provides a CLI for tracking collective spatiotemporal events.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use arcos_track::{Column, Raster, Table};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Collective spatiotemporal event tracker.
#[derive(Parser)]
#[command(name = "arcos")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track collective events in tabular or raster input.
    Track {
        #[command(subcommand)]
        target: TrackTarget,
    },
}

#[derive(Subcommand)]
enum TrackTarget {
    /// Track events in a CSV table of per-observation rows.
    Csv {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Coordinate columns, in order (e.g. `-c x -c y`)
        #[arg(short = 'c', long = "coord-column", required = true)]
        coord_columns: Vec<String>,

        /// Frame/timepoint column
        #[arg(long, default_value = "frame")]
        frame_column: String,

        /// Object id column, used as a secondary sort key within a frame
        #[arg(long)]
        object_id_column: Option<String>,

        /// Binary activity column; rows with a non-positive value are dropped
        #[arg(long)]
        binary_column: Option<String>,

        /// Output column holding the assigned collective event id
        #[arg(long, default_value = "clTrackID")]
        event_id_column: String,

        /// Clustering method: "dbscan" or "hdbscan"
        #[arg(long, default_value = "dbscan")]
        method: String,

        /// Clustering radius
        #[arg(long)]
        eps: f64,

        /// Linking radius across frames; defaults to `eps`
        #[arg(long = "eps-prev")]
        eps_prev: Option<f64>,

        /// Minimum cluster size
        #[arg(long, default_value = "1")]
        min_cluster_size: usize,

        /// HDBSCAN minimum samples
        #[arg(long)]
        min_samples: Option<usize>,

        /// HDBSCAN cluster-selection epsilon
        #[arg(long, default_value = "0.0")]
        cluster_selection_epsilon: f64,

        /// Minimum overlap required to propagate an id across frames
        #[arg(long, default_value = "1")]
        propagation_threshold: usize,

        /// Number of prior frames kept eligible for linking
        #[arg(long, default_value = "1")]
        n_prev: usize,

        /// Worker pool size for per-frame clustering
        #[arg(long, default_value = "1")]
        n_jobs: usize,
    },

    /// Track events in a JSON-encoded dense tensor (`{"shape": [...], "data": [...]}`).
    Raster {
        /// Input JSON file
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Axis layout, e.g. "TXY" or "TZXY"
        #[arg(long, default_value = "TXY")]
        dims: String,

        /// Clustering method: "dbscan" or "hdbscan"
        #[arg(long, default_value = "dbscan")]
        method: String,

        /// Clustering radius
        #[arg(long)]
        eps: f64,

        /// Linking radius across frames; defaults to `eps`
        #[arg(long = "eps-prev")]
        eps_prev: Option<f64>,

        /// Minimum cluster size
        #[arg(long, default_value = "1")]
        min_cluster_size: usize,

        /// HDBSCAN minimum samples
        #[arg(long)]
        min_samples: Option<usize>,

        /// HDBSCAN cluster-selection epsilon
        #[arg(long, default_value = "0.0")]
        cluster_selection_epsilon: f64,

        /// Minimum overlap required to propagate an id across frames
        #[arg(long, default_value = "1")]
        propagation_threshold: usize,

        /// Number of prior frames kept eligible for linking
        #[arg(long, default_value = "1")]
        n_prev: usize,

        /// Worker pool size for per-frame clustering
        #[arg(long, default_value = "1")]
        n_jobs: usize,
    },
}

fn install_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn main() -> Result<()> {
    install_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Track { target } => match target {
            TrackTarget::Csv {
                input,
                output,
                coord_columns,
                frame_column,
                object_id_column,
                binary_column,
                event_id_column,
                method,
                eps,
                eps_prev,
                min_cluster_size,
                min_samples,
                cluster_selection_epsilon,
                propagation_threshold,
                n_prev,
                n_jobs,
            } => run_track_csv(
                &input,
                &output,
                &coord_columns,
                &frame_column,
                object_id_column.as_deref(),
                binary_column.as_deref(),
                &event_id_column,
                TrackParams {
                    method,
                    eps,
                    eps_prev,
                    min_cluster_size,
                    min_samples,
                    cluster_selection_epsilon,
                    propagation_threshold,
                    n_prev,
                    n_jobs,
                },
            ),
            TrackTarget::Raster {
                input,
                output,
                dims,
                method,
                eps,
                eps_prev,
                min_cluster_size,
                min_samples,
                cluster_selection_epsilon,
                propagation_threshold,
                n_prev,
                n_jobs,
            } => run_track_raster(
                &input,
                &output,
                &dims,
                TrackParams {
                    method,
                    eps,
                    eps_prev,
                    min_cluster_size,
                    min_samples,
                    cluster_selection_epsilon,
                    propagation_threshold,
                    n_prev,
                    n_jobs,
                },
            ),
        },
    }
}

struct TrackParams {
    method: String,
    eps: f64,
    eps_prev: Option<f64>,
    min_cluster_size: usize,
    min_samples: Option<usize>,
    cluster_selection_epsilon: f64,
    propagation_threshold: usize,
    n_prev: usize,
    n_jobs: usize,
}

impl TrackParams {
    fn into_config(self) -> arcos_track::ClusteringConfig {
        let mut config = arcos_track::ClusteringConfig::new(self.method, self.eps)
            .with_min_cluster_size(self.min_cluster_size)
            .with_cluster_selection_epsilon(self.cluster_selection_epsilon)
            .with_propagation_threshold(self.propagation_threshold)
            .with_n_prev(self.n_prev)
            .with_n_jobs(self.n_jobs);
        if let Some(eps_prev) = self.eps_prev {
            config = config.with_eps_prev(eps_prev);
        }
        if let Some(min_samples) = self.min_samples {
            config = config.with_min_samples(min_samples);
        }
        config
    }
}

#[allow(clippy::too_many_arguments)]
fn run_track_csv(
    input: &PathBuf,
    output: &PathBuf,
    coord_columns: &[String],
    frame_column: &str,
    object_id_column: Option<&str>,
    binary_column: Option<&str>,
    event_id_column: &str,
    params: TrackParams,
) -> Result<()> {
    tracing::info!(input = %input.display(), "reading csv");
    let table = read_csv(input, coord_columns, frame_column, object_id_column, binary_column)
        .with_context(|| format!("reading {}", input.display()))?;
    tracing::info!(rows = table.len(), "loaded table");

    let config = params.into_config();
    let result = match coord_columns.len() {
        1 => arcos_track::track_events_dataframe::<1>(
            &table,
            &config,
            [coord_columns[0].clone()],
            frame_column.to_string(),
            object_id_column.map(str::to_string),
            binary_column.map(str::to_string),
            event_id_column.to_string(),
        ),
        2 => arcos_track::track_events_dataframe::<2>(
            &table,
            &config,
            [coord_columns[0].clone(), coord_columns[1].clone()],
            frame_column.to_string(),
            object_id_column.map(str::to_string),
            binary_column.map(str::to_string),
            event_id_column.to_string(),
        ),
        3 => arcos_track::track_events_dataframe::<3>(
            &table,
            &config,
            [coord_columns[0].clone(), coord_columns[1].clone(), coord_columns[2].clone()],
            frame_column.to_string(),
            object_id_column.map(str::to_string),
            binary_column.map(str::to_string),
            event_id_column.to_string(),
        ),
        n => bail!("expected 1-3 coordinate columns, got {n}"),
    }?;

    tracing::info!(output = %output.display(), "writing csv");
    write_csv(output, &result).with_context(|| format!("writing {}", output.display()))?;
    println!("Tracked {} rows across {} coordinate dimensions", result.len(), coord_columns.len());
    Ok(())
}

fn run_track_raster(input: &PathBuf, output: &PathBuf, dims: &str, params: TrackParams) -> Result<()> {
    tracing::info!(input = %input.display(), "reading raster json");
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let raster: Raster = serde_json::from_reader(BufReader::new(file))?;

    let spatial_axes = dims.chars().filter(|&c| c != 'T').count();
    let config = params.into_config();
    let result = match spatial_axes {
        1 => arcos_track::track_events_image::<1>(&raster, dims, &config),
        2 => arcos_track::track_events_image::<2>(&raster, dims, &config),
        3 => arcos_track::track_events_image::<3>(&raster, dims, &config),
        n => bail!("`dims` must name 1-3 spatial axes, got {n}"),
    }?;

    tracing::info!(output = %output.display(), "writing raster json");
    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    serde_json::to_writer(BufWriter::new(file), &result)?;
    println!("Tracked raster of shape {:?}", result.shape);
    Ok(())
}

fn read_csv(
    path: &PathBuf,
    coord_columns: &[String],
    frame_column: &str,
    object_id_column: Option<&str>,
    binary_column: Option<&str>,
) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let index_of = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("column {name:?} not found in {}", path.display()))
    };

    let frame_idx = index_of(frame_column)?;
    let coord_idxs: Vec<usize> = coord_columns.iter().map(|c| index_of(c)).collect::<Result<_>>()?;
    let object_idx = object_id_column.map(index_of).transpose()?;
    let binary_idx = binary_column.map(index_of).transpose()?;

    let mut frames = Vec::new();
    let mut coords: Vec<Vec<f64>> = vec![Vec::new(); coord_columns.len()];
    let mut object_ids = Vec::new();
    let mut binaries = Vec::new();

    for record in reader.records() {
        let record = record?;
        frames.push(record[frame_idx].parse::<i64>().context("parsing frame column")?);
        for (slot, &idx) in coord_idxs.iter().enumerate() {
            coords[slot].push(record[idx].parse::<f64>().context("parsing coordinate column")?);
        }
        if let Some(idx) = object_idx {
            object_ids.push(record[idx].to_string());
        }
        if let Some(idx) = binary_idx {
            binaries.push(record[idx].parse::<f64>().context("parsing binary column")?);
        }
    }

    let mut table = Table::new().with_column(frame_column, Column::I64(frames))?;
    for (name, values) in coord_columns.iter().zip(coords) {
        table = table.with_column(name.clone(), Column::F64(values))?;
    }
    if let Some(name) = object_id_column {
        table = table.with_column(name, Column::Str(object_ids))?;
    }
    if let Some(name) = binary_column {
        table = table.with_column(name, Column::F64(binaries))?;
    }
    Ok(table)
}

fn write_csv(path: &PathBuf, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let names = table.column_names();
    writer.write_record(names)?;

    for row in 0..table.len() {
        let mut record = Vec::with_capacity(names.len());
        for name in names {
            let column = table.column(name)?;
            let cell = if let Some(v) = column.as_f64() {
                v[row].to_string()
            } else if let Some(v) = column.as_i64() {
                v[row].to_string()
            } else if let Some(v) = column.as_str() {
                v[row].clone()
            } else {
                unreachable!("Column has exactly three variants")
            };
            record.push(cell);
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
