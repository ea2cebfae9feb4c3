use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context};
use clap::{Parser, Subcommand};
use log::{error, info, trace};
use rayon::prelude::*;
use tempfile::NamedTempFile;

use huffpack::{Body, CodeTable, Container};

const SUFFIX: &str = "huff";

#[derive(Parser)]
#[command(name = "huffpack", version, about = "Huffman-compress files and directories")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a file, or every file under a directory, into OUTPUT_DIR
    Compress { input: PathBuf, output_dir: PathBuf },
    /// Restore `.huff` files into OUTPUT_DIR
    Decompress { input: PathBuf, output_dir: PathBuf },
    /// Print the header and code table of a `.huff` file
    Inspect { file: PathBuf },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Compress,
    Decompress,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compress { input, output_dir } => {
            run(&input, &output_dir, Direction::Compress)?;
            info!("Compression completed successfully.");
        }
        Command::Decompress { input, output_dir } => {
            run(&input, &output_dir, Direction::Decompress)?;
            info!("Decompression completed successfully.");
        }
        Command::Inspect { file } => print!("{}", inspect(&file)?),
    }
    Ok(())
}

fn run(input: &Path, output_dir: &Path, direction: Direction) -> anyhow::Result<Vec<PathBuf>> {
    ensure!(input.exists(), "input path does not exist: {}", input.display());
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    // (source, path relative to output_dir); directory inputs keep their
    // layout under output_dir
    let jobs: Vec<(PathBuf, PathBuf)> = if input.is_dir() {
        let mut files = Vec::new();
        collect_files(input, &mut files)?;
        if direction == Direction::Decompress {
            files.retain(|f| f.extension().is_some_and(|ext| ext == SUFFIX));
        }
        files
            .into_iter()
            .map(|file| -> anyhow::Result<(PathBuf, PathBuf)> {
                let relative = file.strip_prefix(input)?.to_path_buf();
                Ok((file, relative))
            })
            .collect::<anyhow::Result<_>>()?
    } else if input.is_file() {
        let name = input
            .file_name()
            .with_context(|| format!("{} has no file name", input.display()))?;
        vec![(input.to_path_buf(), PathBuf::from(name))]
    } else {
        bail!("invalid input path: {}", input.display());
    };

    let jobs = jobs
        .into_iter()
        .map(|(file, relative)| -> anyhow::Result<(PathBuf, PathBuf)> {
            let destination = output_dir.join(output_name(&relative, direction)?);
            Ok((file, destination))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    // each file is an independent run with its own tables
    let results: Vec<_> = jobs
        .par_iter()
        .map(|(file, destination)| {
            process_file(file, destination, direction)
                .with_context(|| format!("processing {}", file.display()))
        })
        .collect();

    let mut written = Vec::with_capacity(results.len());
    let mut failures = 0;
    for result in results {
        match result {
            Ok(path) => written.push(path),
            Err(e) => {
                error!("{e:#}");
                failures += 1;
            }
        }
    }
    ensure!(failures == 0, "{failures} of {} files failed", jobs.len());
    Ok(written)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(())
}

/// Destination for `input` with its parent directories kept: the suffix is
/// appended when compressing and stripped when decompressing.
fn output_name(input: &Path, direction: Direction) -> anyhow::Result<PathBuf> {
    let name = input
        .file_name()
        .with_context(|| format!("{} has no file name", input.display()))?;
    Ok(match direction {
        Direction::Compress => {
            let mut name = name.to_os_string();
            name.push(".");
            name.push(SUFFIX);
            input.with_file_name(name)
        }
        Direction::Decompress => {
            ensure!(
                input.extension().is_some_and(|ext| ext == SUFFIX),
                "{} does not end in .{SUFFIX}",
                input.display()
            );
            input.with_file_name(input.file_stem().unwrap_or(name))
        }
    })
}

/// Transforms one file fully in memory, then stages the result next to
/// `destination` and renames it into place. A failure leaves no output file.
fn process_file(input: &Path, destination: &Path, direction: Direction) -> anyhow::Result<PathBuf> {
    let bytes = fs::read(input).context("reading input")?;

    let output = match direction {
        Direction::Compress => huffpack::compress(&bytes),
        Direction::Decompress => huffpack::decompress(&bytes)?,
    };

    let parent = destination
        .parent()
        .with_context(|| format!("{} has no parent directory", destination.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("creating output directory {}", parent.display()))?;

    let mut staged = NamedTempFile::new_in(parent).context("creating staging file")?;
    staged.write_all(&output).context("writing staging file")?;
    staged
        .persist(destination)
        .map_err(|e| e.error)
        .with_context(|| format!("moving output to {}", destination.display()))?;

    info!(
        "{} -> {} ({} -> {} bytes)",
        input.display(),
        destination.display(),
        bytes.len(),
        output.len()
    );
    Ok(destination.to_path_buf())
}

fn inspect(file: &Path) -> anyhow::Result<String> {
    use std::fmt::Write as _;

    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let container = Container::deserialize(&bytes)?;
    let mut out = String::new();

    writeln!(out, "Container: {} bytes", bytes.len())?;
    writeln!(out, "Mode: {:?}", container.mode())?;
    writeln!(out, "Original length: {}", container.original_length)?;

    if let Some(tree) = huffpack::embedded_tree(&container)? {
        trace!("embedded tree:\n{}", tree.render());
        let codes = CodeTable::from_tree(&tree);
        writeln!(out, "Symbols: {}", codes.len())?;
        if let Body::General { payload_bits, .. } = &container.body {
            writeln!(out, "Payload bits: {payload_bits}")?;
        }
        for (symbol, code) in codes.iter() {
            writeln!(out, "  {symbol:#04x} {code}")?;
        }
    }
    Ok(out)
}
