//! The generate command
//!
//! Loads the catalog and configuration, runs the generator once, and writes
//! the units below the output directory.

use anyhow::{bail, Context, Result};
use forge_catch::{Catalog, DirSink, Generator, GeneratorConfig, MemorySink, RunOutcome, RunReport};
use std::path::PathBuf;
use tracing::info;

/// Run the generate command with the given arguments
pub fn run(args: &[String]) -> Result<()> {
    let cmd = GenerateCommand::parse(args)?;
    let config = cmd.config()?;

    let catalog = Catalog::from_path(&cmd.catalog)
        .with_context(|| format!("failed to load catalog {}", cmd.catalog.display()))?;
    info!(
        catalog = %cmd.catalog.display(),
        types = catalog.types().len(),
        functions = catalog.functions().len(),
        "catch.cli catalog loaded"
    );

    let generator = Generator::new(config);
    let report = if cmd.dry_run {
        let mut sink = MemorySink::new();
        let report = generator.run(&catalog, &mut sink)?;
        for key in sink.keys() {
            println!("{}", cmd.output.join(key).display());
        }
        report
    } else {
        let mut sink = DirSink::new(&cmd.output);
        generator.run(&catalog, &mut sink)?
    };

    summarize(&report);
    if !report.is_success() {
        bail!("{} unit(s) could not be written", report.failed.len());
    }
    Ok(())
}

/// Generate command configuration
struct GenerateCommand {
    /// Symbol catalog path
    catalog: PathBuf,
    /// Optional TOML config; flags are applied on top of it
    config: Option<PathBuf>,
    /// Output root
    output: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    raise: bool,
    either: bool,
    effect: bool,
    dry_run: bool,
}

impl GenerateCommand {
    fn parse(args: &[String]) -> Result<Self> {
        let mut catalog = None;
        let mut cmd = GenerateCommand {
            catalog: PathBuf::new(),
            config: None,
            output: PathBuf::from("generated"),
            include: Vec::new(),
            exclude: Vec::new(),
            raise: false,
            either: false,
            effect: false,
            dry_run: false,
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--catalog" | "-c" => {
                    catalog = Some(PathBuf::from(value(args, i)?));
                    i += 2;
                }
                "--config" => {
                    cmd.config = Some(PathBuf::from(value(args, i)?));
                    i += 2;
                }
                "--out" | "-o" => {
                    cmd.output = PathBuf::from(value(args, i)?);
                    i += 2;
                }
                "--include" | "-i" => {
                    cmd.include.push(value(args, i)?.clone());
                    i += 2;
                }
                "--exclude" | "-x" => {
                    cmd.exclude.push(value(args, i)?.clone());
                    i += 2;
                }
                "--raise" => {
                    cmd.raise = true;
                    i += 1;
                }
                "--either" => {
                    cmd.either = true;
                    i += 1;
                }
                "--effect" => {
                    cmd.effect = true;
                    i += 1;
                }
                "--dry-run" => {
                    cmd.dry_run = true;
                    i += 1;
                }
                _ => {
                    bail!("Unknown flag: {}", args[i]);
                }
            }
        }

        match catalog {
            Some(path) => cmd.catalog = path,
            None => bail!("--catalog is required"),
        }
        Ok(cmd)
    }

    /// Config file (if any) with command-line selections merged in
    fn config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => GeneratorConfig::new(),
        };

        config.include.extend(self.include.iter().cloned());
        config.exclude.extend(self.exclude.iter().cloned());
        config.raise |= self.raise;
        config.either |= self.either;
        config.effect |= self.effect;
        Ok(config)
    }
}

fn value(args: &[String], i: usize) -> Result<&String> {
    match args.get(i + 1) {
        Some(v) => Ok(v),
        None => bail!("{} requires a value", args[i]),
    }
}

fn summarize(report: &RunReport) {
    if report.outcome == RunOutcome::NoOp {
        println!("Nothing to generate: pass --raise, --either or --effect");
        return;
    }

    for name in &report.misses {
        println!("  not found: {}", name);
    }
    for name in &report.excluded {
        println!("  excluded:  {}", name);
    }
    for failure in &report.failed {
        eprintln!("  failed:    {} ({})", failure.key, failure.error);
    }
    println!(
        "Generated {} unit(s), {} skipped, {} failed",
        report.emitted.len(),
        report.skipped.len(),
        report.failed.len()
    );
}
