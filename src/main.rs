use chrono::Local;
use clap::{Args, Parser, Subcommand};
use layered_merkle::bytes::{bufferify, parse_hex, to_hex};
use layered_merkle::hashtree::proof;
use layered_merkle::{
  Algorithm, Error, HashFunction, HashTree, LayeredHashTree, Mode, Proof, ProofStep, Result, load_leaves, sample_leaves,
};
use log::{debug, info};
use rand::seq::SliceRandom;
use std::fs::{create_dir_all, read_to_string};
use std::hint::black_box;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use crate::report::{ProofSample, Report, Row, Trials, tree_sizes};

mod report;

#[derive(Parser)]
#[command(name = "layered_merkle")]
#[command(author, version, about = "Build Merkle trees from hashed leaves, derive inclusion proofs and verify them")]
struct Cli {
  /// Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
  #[arg(long, global = true, default_value = "warn")]
  log_level: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the root hash
  Root(TreeArgs),

  /// Print every layer, root first
  Tree(TreeArgs),

  /// Print the inclusion proof of a leaf, one `left:<hex>` or `right:<hex>` step per line
  Proof {
    #[command(flatten)]
    tree: TreeArgs,

    /// Position of the leaf; required to tell duplicate leaves apart
    #[arg(short, long, required_unless_present = "leaf")]
    index: Option<usize>,

    /// The leaf itself (hex, or raw text with --leaf-hash); the first equal leaf is used
    #[arg(short, long)]
    leaf: Option<String>,
  },

  /// Check a proof against a root; exits with status 1 if it does not verify
  Verify {
    #[command(flatten)]
    hash: HashArgs,

    /// Hash of the leaf being proved
    #[arg(short, long)]
    target: String,

    /// Expected root hash
    #[arg(short, long)]
    root: String,

    /// Read proof steps from a file instead of the command line
    #[arg(short, long, conflicts_with = "steps")]
    proof: Option<PathBuf>,

    /// Proof steps in order, e.g. `left:0x1234 right:0xabcd`
    steps: Vec<String>,
  },

  /// Measure construction, proof generation and verification times against the number of leaves
  Bench(BenchArgs),
}

#[derive(Args)]
struct HashArgs {
  /// Hash function for internal nodes
  #[arg(long = "hash", value_enum, default_value_t = Algorithm::Sha256)]
  algorithm: Algorithm,

  /// Combine nodes like Bitcoin: byte-reversed double hashing, lonely nodes paired with themselves
  #[arg(long)]
  bitcoin: bool,
}

impl HashArgs {
  fn mode(&self) -> Mode {
    if self.bitcoin { Mode::Bitcoin } else { Mode::Standard }
  }
}

#[derive(Args)]
struct TreeArgs {
  #[command(flatten)]
  hash: HashArgs,

  /// Hash raw leaves with this function instead of reading them as hex. A raw leaf is taken as text unless it
  /// carries a `0x` prefix; `#` starts a comment only in hex leaf files
  #[arg(long, value_enum)]
  leaf_hash: Option<Algorithm>,

  /// Read leaves from a file, one per line
  #[arg(short, long)]
  file: Option<PathBuf>,

  /// Leaves given on the command line, after those read from --file
  leaves: Vec<String>,
}

impl TreeArgs {
  fn leaf(&self, text: &str) -> Result<Vec<u8>> {
    match self.leaf_hash {
      Some(algorithm) => Ok(algorithm.hash(&bufferify(text))),
      None => parse_hex(text),
    }
  }

  fn build(&self) -> Result<LayeredHashTree<Algorithm>> {
    let raw = self.leaf_hash.is_some();
    let mut leaves = match &self.file {
      Some(path) => load_leaves(path, raw)?,
      None => Vec::new(),
    };
    for text in self.leaves.iter() {
      leaves.push(if raw { bufferify(text) } else { parse_hex(text)? });
    }
    if let Some(algorithm) = self.leaf_hash {
      leaves = leaves.iter().map(|data| algorithm.hash(data)).collect();
    }
    info!("building {} tree over {} leaves with {}", self.hash.mode(), leaves.len(), self.hash.algorithm);
    Ok(LayeredHashTree::new(leaves, self.hash.algorithm, self.hash.mode()))
  }
}

#[derive(Args)]
struct BenchArgs {
  #[command(flatten)]
  hash: HashArgs,

  /// Largest number of leaves
  #[arg(short = 'n', long, default_value_t = 1024 * 1024)]
  max_n: usize,

  /// Number of tree sizes measured between 1 and --max-n (logarithmic scale)
  #[arg(short, long, default_value_t = 20)]
  division: usize,

  /// Proofs generated and verified per tree size
  #[arg(long, default_value_t = 1000)]
  samples: usize,

  /// Minimum number of tree constructions per size
  #[arg(long, default_value_t = 3)]
  min_trials: usize,

  /// Maximum number of tree constructions per size
  #[arg(long, default_value_t = 20)]
  max_trials: usize,

  /// Stop repeating once StdDev / Mean falls below this value
  #[arg(long, default_value_t = 0.1)]
  stability_threshold: f64,

  /// Directory the CSV reports are written to
  #[arg(short, long, default_value = ".")]
  output: PathBuf,

  #[arg(short, long, default_value_t = Local::now().format("%Y%m%d%H%M%S").to_string())]
  session: String,
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();
  env_logger::init_from_env(env_logger::Env::default().default_filter_or(cli.log_level.as_str()));

  match cli.command {
    Command::Root(args) => {
      let tree = args.build()?;
      println!("{}", tree.root_hex());
    }
    Command::Tree(args) => {
      let tree = args.build()?;
      print!("{tree}");
    }
    Command::Proof { tree: args, index, leaf } => {
      let tree = args.build()?;
      let leaf = match (index, &leaf) {
        (Some(i), _) => tree.leaf(i).ok_or(Error::IndexOutOfRange { index: i, size: tree.size() })?.to_vec(),
        (None, Some(text)) => {
          let leaf = args.leaf(text)?;
          if tree.leaf_index(&leaf).is_none() {
            return Err(Error::LeafNotFound(to_hex(&leaf)));
          }
          leaf
        }
        (None, None) => unreachable!("clap requires --index or --leaf"),
      };
      print!("{}", tree.generate_proof(&leaf, index));
    }
    Command::Verify { hash, target, root, proof: path, steps } => {
      let candidate = match path {
        Some(path) => Proof::from_str(&read_to_string(path)?)?,
        None => Proof::new(steps.iter().map(|s| ProofStep::from_str(s)).collect::<Result<Vec<_>>>()?),
      };
      let target = parse_hex(&target)?;
      let root = parse_hex(&root)?;
      let verified = proof::verify(&hash.algorithm, hash.mode(), &candidate, &target, &root);
      debug!("verified {} steps against {}: {verified}", candidate.len(), to_hex(&root));
      println!("{verified}");
      if !verified {
        return Ok(ExitCode::FAILURE);
      }
    }
    Command::Bench(args) => bench(&args)?,
  }
  Ok(ExitCode::SUCCESS)
}

fn bench(args: &BenchArgs) -> Result<()> {
  let algorithm = args.hash.algorithm;
  let mode = args.hash.mode();
  create_dir_all(&args.output)?;
  println!("[bench] {algorithm} {mode}, up to {} leaves", args.max_n);

  let trials = Trials { min: args.min_trials, max: args.max_trials, threshold: args.stability_threshold };
  let mut rng = rand::rng();
  let mut report = Report::new(algorithm, mode);
  let sizes = tree_sizes(args.max_n, args.division);
  for (i, n) in sizes.iter().copied().enumerate() {
    let leaves = sample_leaves(n, &algorithm);

    let build = trials.run(|| {
      let leaves = leaves.clone();
      let start = Instant::now();
      let tree = LayeredHashTree::new(leaves, algorithm, mode);
      let elapse = start.elapsed();
      black_box(tree.root());
      elapse
    });

    let tree = LayeredHashTree::new(leaves.clone(), algorithm, mode);
    let mut indices = (0..n).collect::<Vec<_>>();
    indices.shuffle(&mut rng);
    indices.truncate(args.samples);
    let samples = indices
      .into_iter()
      .map(|k| {
        let start = Instant::now();
        let proof = tree.generate_proof(&leaves[k], Some(k));
        let prove = start.elapsed();

        let start = Instant::now();
        let verified = tree.verify(&proof, &leaves[k], tree.root());
        let verify = start.elapsed();
        debug_assert!(verified || n == 1);
        ProofSample::new(&proof, prove, verify)
      })
      .collect::<Vec<_>>();

    let row = Row::new(n, tree.depth(), &build, &samples);
    eprintln!("  [{}/{}] {row}", i + 1, sizes.len());
    report.insert(row);
  }

  let path = args.output.join(report.file_name(&args.session));
  report.save_csv(&path)?;
  println!("==> The results have been saved in: {}", path.to_string_lossy());
  Ok(())
}
