use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tree2tax::model::PhyloTree;
use tree2tax::ranks::{DEFAULT_RANK_PREFIXES, DEFAULT_THRESHOLDS, RankedTaxonomyBuilder};
use tree2tax::{ThresholdFinder, named_clusters_for_several_thresholds, parse_newick_file};

/// Cluster the tips of an annotated phylogenetic tree into taxonomic groups.
#[derive(Debug, Parser)]
#[command(name = "tree2tax", version, about)]
struct Cli {
    /// Output debug information
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cluster tips at one or more tree distance thresholds
    Cluster {
        /// Newick tree file to partition
        #[arg(short, long)]
        tree: PathBuf,

        /// Tree distance threshold, may be given several times
        #[arg(short = 'd', long = "threshold", required = true)]
        thresholds: Vec<f64>,
    },
    /// Derive per-rank thresholds from the taxonomy annotated on a tree
    Thresholds {
        /// Annotated Newick tree file
        #[arg(short, long)]
        tree: PathBuf,

        /// Rank prefixes, coarsest first
        #[arg(long, num_args = 2.., default_values_t = DEFAULT_RANK_PREFIXES.map(String::from))]
        prefixes: Vec<String>,
    },
    /// Assign a full kingdom-to-species taxonomy to every tip
    Taxonomy {
        /// Annotated Newick tree file
        #[arg(short, long)]
        tree: PathBuf,

        /// One threshold per rank, kingdom to species, never increasing
        #[arg(long, num_args = 7, default_values_t = DEFAULT_THRESHOLDS)]
        thresholds: Vec<f64>,

        /// Label ranks with the annotation found since the coarser rank
        #[arg(long)]
        intermediate: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match cli.command {
        Command::Cluster { tree, thresholds } => cluster(&read_tree(&tree)?, &thresholds, &mut out)?,
        Command::Thresholds { tree, prefixes } => thresholds(&read_tree(&tree)?, &prefixes, &mut out)?,
        Command::Taxonomy {
            tree,
            thresholds,
            intermediate,
        } => taxonomy(&read_tree(&tree)?, &thresholds, intermediate, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_tree(path: &Path) -> anyhow::Result<PhyloTree> {
    info!("Reading tree file {}", path.display());
    let tree = parse_newick_file(path).with_context(|| format!("failed to read tree from {}", path.display()))?;
    info!("Read in tree with {} tips", tree.num_tips());
    Ok(tree)
}

/// Prints one line per tip: the tip name, then its cluster name at each
/// threshold (ascending).
fn cluster<W: Write>(tree: &PhyloTree, thresholds: &[f64], out: &mut W) -> anyhow::Result<()> {
    let results = named_clusters_for_several_thresholds(tree, thresholds)?;
    let Some(first) = results.first() else {
        bail!("no thresholds given");
    };

    let mut num_singletons = 0;
    for cluster in first.clusters() {
        if cluster.tips().len() == 1 {
            num_singletons += 1;
        }
        for tip in cluster.tips() {
            let mut line = tip.name.clone().unwrap_or_default();
            for result in &results {
                let name = result.tip_to_cluster(tip.index).map(|c| c.name()).unwrap_or_default();
                line.push('\t');
                line.push_str(&name);
            }
            writeln!(out, "{}", line)?;
        }
    }
    info!(
        "Of {} clusters at threshold {}, {} contained only a single sequence",
        first.clusters().len(),
        first.threshold(),
        num_singletons
    );
    Ok(())
}

/// Prints one line per rank after the first: prefix and threshold.
fn thresholds<W: Write>(tree: &PhyloTree, prefixes: &[String], out: &mut W) -> anyhow::Result<()> {
    let thresholds = ThresholdFinder::new(tree).find_thresholds(prefixes)?;
    for (prefix, threshold) in prefixes.iter().skip(1).zip(thresholds) {
        writeln!(out, "{}\t{}", prefix, threshold)?;
    }
    Ok(())
}

/// Prints one line per tip: the tip name and its `k__...; ...; s__...` taxonomy.
fn taxonomy<W: Write>(tree: &PhyloTree, thresholds: &[f64], intermediate: bool, out: &mut W) -> anyhow::Result<()> {
    let taxonomy = RankedTaxonomyBuilder::new()
        .with_thresholds(thresholds)
        .with_intermediate_taxonomy(intermediate)
        .build(tree)?;
    for tip in taxonomy.tips() {
        writeln!(out, "{}\t{}", tip.name.as_deref().unwrap_or_default(), tip.taxonomy)?;
    }
    Ok(())
}
