//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
    process::exit,
};

use combyte::tools::cli::{combyte_opts_init, CombyteOpts, Mode, Output};
use combyte::{
    compress_with, decompress_parallel, test_stream, CombyteError, CompressOptions, StreamStats,
};

use log::{error, info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use tikv_jemallocator::Jemalloc;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const EXTENSION: &str = ".combyte";

fn main() {
    // Available log levels are Error, Warn, Info, Debug, Trace
    // Logs go to stderr so that --stdout output stays clean.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Can't start the logger: {}", e);
    }

    let opts = combyte_opts_init();

    //----- Figure how what we need to do and go do it
    let result = match opts.op_mode {
        Mode::Zip => zip(&opts),
        Mode::Unzip => unzip(&opts),
        Mode::Test => test(&opts),
    };

    match result {
        Ok(stats) => info!(
            "Done. {} blocks, {} bytes in, {} bytes out.\n",
            stats.blocks, stats.bytes_in, stats.bytes_out
        ),
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    }
}

/// Compress FILE into FILE.combyte (or stdout).
fn zip(opts: &CombyteOpts) -> Result<StreamStats, CombyteError> {
    let fname = input_name(opts)?;
    let fin = BufReader::new(File::open(fname)?);
    let mut out_name = fname.to_string();
    out_name.push_str(EXTENSION);
    let f_out = open_output(opts, &out_name)?;

    let compress_opts = CompressOptions {
        level: opts.level,
        workers: opts.jobs,
        algorithm: opts.algorithm,
    };
    compress_with(fin, f_out, &compress_opts)
}

/// Extract FILE.combyte into FILE (or stdout).
fn unzip(opts: &CombyteOpts) -> Result<StreamStats, CombyteError> {
    let fname = input_name(opts)?;
    if !fname.contains(EXTENSION) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a combyte file. Extraction aborted.", fname),
        )
        .into());
    }
    let fin = BufReader::new(File::open(fname)?);
    let out_name = fname.replacen(EXTENSION, "", 1);
    extract(fin, opts, &out_name)
}

/// Decode a stream into out_name. A damaged stream must not leave a partial file behind.
fn extract<R: Read + Send>(
    fin: R,
    opts: &CombyteOpts,
    out_name: &str,
) -> Result<StreamStats, CombyteError> {
    let f_out = open_output(opts, out_name)?;
    let result = decompress_parallel(fin, f_out, opts.jobs);
    if result.is_err() && opts.output == Output::File {
        match fs::remove_file(out_name) {
            Ok(()) => warn!("Removed the partial output file {}", out_name),
            Err(e) => warn!("Can't remove the partial output file {}: {}", out_name, e),
        }
    }
    result
}

/// Decode FILE without writing anything.
fn test(opts: &CombyteOpts) -> Result<StreamStats, CombyteError> {
    let fname = input_name(opts)?;
    let stats = test_stream(BufReader::new(File::open(fname)?))?;
    info!("{}: ok", fname);
    Ok(stats)
}

fn input_name(opts: &CombyteOpts) -> Result<&str, CombyteError> {
    opts.file.as_deref().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "No input file given.").into()
    })
}

/// Open the output file, refusing to replace an existing one unless forced.
fn open_output(opts: &CombyteOpts, fname: &str) -> Result<Box<dyn Write>, CombyteError> {
    if opts.output == Output::Stdout {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if Path::new(fname).exists() && !opts.force_overwrite {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Output file {} already exists. Use --force to overwrite.", fname),
        )
        .into());
    }
    info!("Writing output to {}", fname);
    let f_out = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(fname)?;
    Ok(Box::new(BufWriter::new(f_out)))
}
