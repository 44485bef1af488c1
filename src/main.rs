use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use transmission_network_analyzer::config::{Config, DateConvention, EdgeWeight};
use transmission_network_analyzer::data::distances::load_snp_distances;
use transmission_network_analyzer::data::merge::{find_cluster_tables, merge_tables};
use transmission_network_analyzer::data::{LabeledPairs, MetadataTable};
use transmission_network_analyzer::storage::{self, derived_path};
use transmission_network_analyzer::{network, transmission, viz};

#[derive(Parser, Debug)]
#[clap(
    name = "transmission-network-analyzer",
    about = "Transmission labels from SNP distances and monthly transmission network centralities"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// TOML configuration file; command-line flags override its values
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0", global = true)]
    threads: usize,

    /// Verbose logging
    #[clap(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Label sample pairs as putative transmissions
    Classify(ClassifyArgs),
    /// Summarise monthly transmission networks by centrality
    Network(NetworkArgs),
    /// Concatenate per-cluster tables
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Headerless snp-dists table (sample1, sample2, snps)
    #[clap(long)]
    snp_dists: PathBuf,

    /// Sample metadata table
    #[clap(long)]
    metadata: PathBuf,

    /// Output table [default: <snp_dists stem>_te.tsv]
    #[clap(long)]
    output: Option<PathBuf>,

    #[clap(long)]
    snps_per_day: Option<f64>,

    #[clap(long)]
    min_snps: Option<u32>,

    /// Half-width of the interval around the expected SNP count
    #[clap(long)]
    ci_half_width: Option<f64>,

    #[clap(long, value_enum)]
    date_convention: Option<DateConvention>,
}

#[derive(Args, Debug)]
struct NetworkArgs {
    /// Labeled pairs written by `classify`
    #[clap(long)]
    labeled_pairs: PathBuf,

    /// Sample metadata table
    #[clap(long)]
    metadata: PathBuf,

    /// Output table [default: <labeled_pairs stem>_network_p.tsv]
    #[clap(long)]
    output: Option<PathBuf>,

    /// Label column that defines edges
    #[clap(long)]
    label: Option<String>,

    #[clap(long, value_enum)]
    edge_weight: Option<EdgeWeight>,

    #[clap(long, value_enum)]
    date_convention: Option<DateConvention>,

    /// Write one GraphML file per month
    #[clap(long)]
    export_graphs: bool,

    /// Directory for GraphML files [default: next to the output table]
    #[clap(long)]
    graph_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Tables to concatenate
    #[clap(long, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Directory holding one sub-directory per cluster
    #[clap(long)]
    cluster_dir: Option<PathBuf>,

    /// File looked up in every cluster directory
    #[clap(long, default_value = "snp-dists.tsv")]
    file_name: String,

    /// Inputs carry a header line; keep only the first one
    #[clap(long)]
    header: bool,

    #[clap(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Classify(cmd) => run_classify(cmd, &mut config),
        Command::Network(cmd) => run_network(cmd, &mut config),
        Command::Merge(cmd) => run_merge(cmd),
    }
}

fn run_classify(args: ClassifyArgs, config: &mut Config) -> Result<()> {
    let classifier = &mut config.classifier;
    if let Some(v) = args.snps_per_day {
        classifier.snps_per_day = v;
    }
    if let Some(v) = args.min_snps {
        classifier.min_snps = v;
    }
    if let Some(v) = args.ci_half_width {
        classifier.ci_half_width = v;
    }
    if let Some(v) = args.date_convention {
        classifier.date_convention = v;
    }
    config.validate()?;

    let output = args
        .output
        .unwrap_or_else(|| derived_path(&args.snp_dists, storage::LABELED_PAIRS_SUFFIX));

    log::info!("Starting transmission classification");
    log::info!("Input: {}", args.snp_dists.display());
    log::info!("Output: {}", output.display());

    // 1. Load data
    let distances = load_snp_distances(&args.snp_dists)?;
    let metadata = MetadataTable::from_tsv(&args.metadata)?;

    // 2. Label pairs
    let (pairs, stats) =
        transmission::classify_distances(&distances, &metadata, &config.classifier)?;
    let positive_pairs = pairs.events.iter().filter(|e| e.transmission).count();
    log::info!(
        "{} of {} pairs labeled as transmissions",
        positive_pairs,
        pairs.len()
    );

    // 3. Save results
    storage::write_labeled_pairs(&pairs, &output)?;
    let summary = storage::ClassifyRunSummary {
        snp_dists: args.snp_dists,
        metadata: args.metadata,
        output: output.clone(),
        preparation: stats,
        positive_pairs,
        labels: pairs.label_names.clone(),
    };
    storage::write_run_summary(&summary, &derived_path(&output, storage::SUMMARY_SUFFIX))?;

    log::info!("Classification complete. Results saved to {}", output.display());
    Ok(())
}

fn run_network(args: NetworkArgs, config: &mut Config) -> Result<()> {
    let network_config = &mut config.network;
    if let Some(v) = args.label {
        network_config.label = v;
    }
    if let Some(v) = args.edge_weight {
        network_config.edge_weight = v;
    }
    if let Some(v) = args.date_convention {
        network_config.date_convention = v;
    }
    if args.export_graphs {
        network_config.export_graphs = true;
    }
    config.validate()?;
    let network_config = &config.network;

    let output = args
        .output
        .unwrap_or_else(|| derived_path(&args.labeled_pairs, storage::NETWORK_SUFFIX));

    log::info!("Starting monthly network analysis");
    log::info!("Input: {}", args.labeled_pairs.display());
    log::info!("Output: {}", output.display());

    // 1. Load data
    let pairs = LabeledPairs::from_tsv(&args.labeled_pairs)?;
    let metadata = MetadataTable::from_tsv(&args.metadata)?;

    // 2. Build monthly graphs and summarise centralities
    let report = network::aggregate(&pairs, &metadata, network_config)?;

    // 3. Save results
    storage::write_network_summary(report.summaries(), &output)?;
    let counts = storage::month_counts(&report);
    storage::write_month_counts(
        &counts,
        &derived_path(&args.labeled_pairs, storage::MONTH_COUNTS_SUFFIX),
    )?;

    // 4. Export graphs if requested
    let graphs = if network_config.export_graphs {
        let dir = match args.graph_dir {
            Some(dir) => dir,
            None => output
                .parent()
                .map(|p| p.join("graphs"))
                .ok_or_else(|| anyhow!("Cannot derive a graph directory from '{}'", output.display()))?,
        };
        let prefix = args
            .labeled_pairs
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "network".to_string());
        let label = pairs.resolve_label(&network_config.label)?;
        viz::export_month_graphs(&report, &metadata, label, &dir, &prefix)?
    } else {
        Vec::new()
    };

    let summary = storage::NetworkRunSummary {
        labeled_pairs: args.labeled_pairs.clone(),
        metadata: args.metadata,
        output: output.clone(),
        label: network_config.label.clone(),
        aggregation: report.stats.clone(),
        months: counts,
        graphs,
    };
    storage::write_run_summary(&summary, &derived_path(&output, storage::SUMMARY_SUFFIX))?;

    log::info!("Analysis complete. Results saved to {}", output.display());
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<()> {
    let mut inputs = args.inputs;
    if let Some(dir) = &args.cluster_dir {
        inputs.extend(find_cluster_tables(dir, &args.file_name)?);
    }

    let rows = merge_tables(&inputs, &args.output, args.header)?;
    log::info!("Merge complete. {} rows saved to {}", rows, args.output.display());
    Ok(())
}
