use std::io::Read;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use capo_core::{split_api_version, ResourceKind, SchemaGeneration, CLUSTER_API_GROUP};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "capoctl", version, about = "Capo CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered kinds
    Kinds {
        /// Only kinds of this API group ("" for the core group)
        #[arg(long = "group")]
        group: Option<String>,
    },
    /// Downgrade a v1beta2 Cluster, Machine or MachinePool manifest to v1beta1
    Convert {
        /// Manifest path (JSON or YAML); "-" or omitted reads stdin
        file: Option<String>,
    },
    /// Decode a manifest through the registry
    Check {
        /// Manifest path (JSON or YAML); "-" or omitted reads stdin
        file: Option<String>,
    },
}

fn init_tracing() {
    let env = std::env::var("CAPO_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn max_input_bytes() -> usize {
    std::env::var("CAPO_MAX_INPUT_BYTES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1 << 20)
}

/// Read at most `max` bytes; one byte more marks the input as oversize.
fn read_capped<R: Read>(reader: R, max: usize) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    reader.take((max as u64).saturating_add(1)).read_to_end(&mut buf)?;
    Ok((buf.len() <= max).then_some(buf))
}

fn read_input(file: Option<&str>) -> Result<Vec<u8>> {
    let max = max_input_bytes();
    let (name, read) = match file {
        None | Some("-") => ("stdin".to_string(), read_capped(std::io::stdin(), max)),
        Some(path) => {
            let f = std::fs::File::open(path).with_context(|| format!("opening {}", path))?;
            (path.to_string(), read_capped(f, max))
        }
    };
    read.with_context(|| format!("reading {}", name))?
        .ok_or_else(|| anyhow!("{} too large (>{} bytes)", name, max))
}

fn emit<T: Serialize>(output: Output, value: &T) -> Result<()> {
    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Output::Human | Output::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

/// The kind to downgrade, if the manifest is a v1beta2 Cluster API record.
fn source_kind(manifest: &Value) -> Result<ResourceKind> {
    let api_version = manifest
        .get("apiVersion")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("manifest has no apiVersion"))?;
    let kind = manifest.get("kind").and_then(Value::as_str).ok_or_else(|| anyhow!("manifest has no kind"))?;
    let (group, version) = split_api_version(api_version);
    if group != CLUSTER_API_GROUP {
        bail!("{} is not a {} kind", api_version, CLUSTER_API_GROUP);
    }
    let generation: SchemaGeneration = version.parse()?;
    if generation.previous().is_none() {
        bail!("{} {} is already the oldest generation", kind, generation);
    }
    Ok(kind.parse()?)
}

#[derive(Serialize)]
struct KindRow<'a> {
    gvk: String,
    plural: &'a str,
    namespaced: bool,
    family: &'a str,
}

#[derive(Serialize)]
struct CheckReport {
    gvk: String,
    namespace: Option<String>,
    name: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let scheme = capo_schema::setup_scheme();

    match cli.command {
        Commands::Kinds { group } => {
            let selected: Vec<_> = match group.as_deref() {
                Some(g) => scheme.kinds_for_group(g).collect(),
                None => scheme.entries().iter().collect(),
            };
            let rows: Vec<KindRow> = selected
                .into_iter()
                .map(|e| KindRow {
                    gvk: e.key(),
                    plural: &e.resource.plural,
                    namespaced: e.namespaced(),
                    family: e.family.as_str(),
                })
                .collect();
            info!(group = ?group, count = rows.len(), "kinds listed");
            match cli.output {
                Output::Human => {
                    for r in &rows {
                        let scope = if r.namespaced { "namespaced" } else { "cluster" };
                        println!("{} • {} • {} • {}", r.gvk, r.plural, scope, r.family);
                    }
                }
                other => emit(other, &rows)?,
            }
        }
        Commands::Convert { file } => {
            let input = read_input(file.as_deref())?;
            let manifest: Value = serde_yaml::from_slice(&input).context("parsing manifest")?;
            let kind = source_kind(&manifest)?;
            debug!(kind = %kind, "downgrading");
            let older = capo_convert::downgrade_value(kind, &manifest).with_context(|| format!("converting {}", kind))?;
            // The result must be a valid record of the target generation.
            scheme.decode_value(older.clone()).context("validating converted manifest")?;
            emit(cli.output, &older)?;
        }
        Commands::Check { file } => {
            let input = read_input(file.as_deref())?;
            let obj = scheme.decode(&input).context("decoding manifest")?;
            let gvk = obj
                .types
                .as_ref()
                .map(|t| format!("{}/{}", t.api_version, t.kind))
                .unwrap_or_default();
            let report = CheckReport { gvk, namespace: obj.metadata.namespace.clone(), name: obj.metadata.name.clone() };
            match cli.output {
                Output::Human => {
                    let ns = report.namespace.as_deref().unwrap_or("-");
                    let name = report.name.as_deref().unwrap_or("-");
                    println!("ok {} {}/{}", report.gvk, ns, name);
                }
                other => emit(other, &report)?,
            }
        }
    }

    Ok(())
}
