use clap::{ArgGroup, Parser};
use log::{info, warn};
use std::{fmt::Display, fmt::Formatter};

use crate::bwt_algorithms::bwt_sort::Algorithm;
use crate::compression::compress::DEFAULT_LEVEL;
use crate::compression::pipeline::default_workers;

/// Compress, Extract, Test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Define the two output channels
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug)]
pub struct CombyteOpts {
    /// Algorithm used for the forward BWT
    pub algorithm: Algorithm,
    /// Name of the file to read for input
    pub file: Option<String>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Worker threads
    pub jobs: usize,
    /// Block size is level * 1024 bytes
    pub level: usize,
    /// Compress/Extract/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// 0 is silent, 5 is trace
    pub verbosity: u8,
}

impl CombyteOpts {
    pub fn new() -> Self {
        Self {
            algorithm: Algorithm::Auto,
            file: None,
            force_overwrite: false,
            jobs: default_workers(),
            level: DEFAULT_LEVEL,
            op_mode: Mode::Zip,
            output: Output::File,
            verbosity: 3,
        }
    }
}

impl Default for CombyteOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "combyte, a block-sorting file compressor",
    long_about = "
    combyte cuts a file into blocks, applies a Burrows-Wheeler Transform and PackBits run length
    coding to each block on every available core, and writes the blocks back in order.

    The compression level sets the block size (level * 1024 bytes). It is not needed to extract."
)]
#[clap(group(ArgGroup::new("mode").required(true).args(&["compress", "extract", "test"])))]
pub struct Args {
    /// Compress the file
    #[clap(short = 'c', long = "compress")]
    compress: bool,

    /// Extract a .combyte file
    #[clap(short = 'e', long = "extract")]
    extract: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    /// The file to compress or extract
    #[clap(long = "filename")]
    filename: String,

    /// Compression level, block size is level * 1024 bytes
    #[clap(short = 'l', long = "level", default_value_t = DEFAULT_LEVEL)]
    level: usize,

    /// Number of worker threads (defaults to the number of cores)
    #[clap(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    /// BWT sort algorithm: auto, native or doubling
    #[clap(long = "algorithm", default_value = "auto")]
    algorithm: Algorithm,

    /// Overwrite an existing output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Send output to the terminal
    #[clap(long = "stdout")]
    stdout: bool,

    /// Sets verbosity. -v1 shows very little, -v5 is chatty
    #[clap(short = 'v', default_value_t = 3)]
    v: u8,
}

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse the command line into CombyteOpts and set the log level.
pub fn combyte_opts_init() -> CombyteOpts {
    // Print opening line
    {
        let descr = "combyte, a block-sorting file compressor.";
        eprintln!("{}  Rust version {}", descr, VERSION);
    }
    opts_from_args(Args::parse())
}

fn opts_from_args(args: Args) -> CombyteOpts {
    let mut opts = CombyteOpts::new();

    opts.op_mode = if args.extract {
        Mode::Unzip
    } else if args.test {
        Mode::Test
    } else {
        Mode::Zip
    };
    opts.file = Some(args.filename);
    opts.level = args.level;
    if let Some(jobs) = args.jobs {
        opts.jobs = jobs.max(1);
    }
    opts.algorithm = args.algorithm;
    opts.force_overwrite = args.force;
    if args.stdout {
        opts.output = Output::Stdout
    };
    opts.verbosity = args.v;

    // Set the log level
    match opts.verbosity {
        0 => log::set_max_level(log::LevelFilter::Off),
        1 => log::set_max_level(log::LevelFilter::Error),
        2 => log::set_max_level(log::LevelFilter::Warn),
        3 => log::set_max_level(log::LevelFilter::Info),
        4 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    };

    // Below we report initialization status to the user
    info!("---- combyte Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    match &opts.file {
        Some(s) => info!("Getting input from the file {}", s),
        None => warn!("No input file given"),
    }
    if opts.op_mode == Mode::Zip {
        info!("Compression level set to {}", opts.level);
        info!("Algorithm set to {:?}", opts.algorithm);
    }
    info!("Using {} worker threads", opts.jobs);
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.output == Output::Stdout {
        info!("Sending output to stdout")
    };
    info!("---- combyte Initialization End ----\n");
    opts
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> CombyteOpts {
        opts_from_args(Args::try_parse_from(args).unwrap())
    }

    #[test]
    fn compress_defaults() {
        let opts = parse(&["combyte", "-c", "--filename", "a.txt"]);
        assert_eq!(opts.op_mode, Mode::Zip);
        assert_eq!(opts.file.as_deref(), Some("a.txt"));
        assert_eq!(opts.level, DEFAULT_LEVEL);
        assert_eq!(opts.algorithm, Algorithm::Auto);
        assert_eq!(opts.output, Output::File);
    }

    #[test]
    fn extract_with_options() {
        let opts = parse(&[
            "combyte",
            "--extract",
            "--filename",
            "a.txt.combyte",
            "-j",
            "2",
            "-f",
            "--stdout",
            "-v",
            "0",
        ]);
        assert_eq!(opts.op_mode, Mode::Unzip);
        assert_eq!(opts.jobs, 2);
        assert!(opts.force_overwrite);
        assert_eq!(opts.output, Output::Stdout);
        assert_eq!(opts.verbosity, 0);
    }

    #[test]
    fn level_and_algorithm() {
        let opts = parse(&[
            "combyte",
            "-c",
            "--filename",
            "x",
            "-l",
            "9",
            "--algorithm",
            "doubling",
        ]);
        assert_eq!(opts.level, 9);
        assert_eq!(opts.algorithm, Algorithm::Doubling);
    }

    #[test]
    fn mode_is_required() {
        assert!(Args::try_parse_from(["combyte", "--filename", "x"]).is_err());
        assert!(Args::try_parse_from(["combyte", "-c", "-e", "--filename", "x"]).is_err());
    }

    #[test]
    fn unknown_algorithm_is_refused() {
        assert!(Args::try_parse_from(["combyte", "-c", "--filename", "x", "--algorithm", "bogo"])
            .is_err());
    }
}
