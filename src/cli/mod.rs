#[cfg(test)]
mod test;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use wrapgen::codegen::{Bindings, TargetProfile};
use wrapgen::diagnostics::{Diagnostic, Reporter};
use yansi::Paint;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "wrapgen",
    version,
    about = "Generate host-language bindings from an interface file"
)]
pub struct Args {
    /// Interface file to read
    pub input: PathBuf,

    /// Built-in profile (`matlab`, `python`) or a path to a JSON profile
    #[arg(short, long, default_value = "matlab")]
    pub profile: String,

    /// Directory to write units into; units go to stdout when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop after validation
    #[arg(long)]
    pub check: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub units: usize,
    pub modules: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl Summary {
    fn count(diagnostics: &[Diagnostic]) -> Self {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        Summary {
            errors,
            warnings: diagnostics.len() - errors,
            ..Summary::default()
        }
    }

    pub fn line(&self) -> String {
        let counts = format!(
            "{} units, {} modules, {} errors, {} warnings",
            self.units, self.modules, self.errors, self.warnings
        );
        if self.errors > 0 {
            format!("{} {}", "wrapgen:".red().bold(), counts)
        } else if self.warnings > 0 {
            format!("{} {}", "wrapgen:".yellow().bold(), counts)
        } else {
            format!("{} {}", "wrapgen:".green().bold(), counts)
        }
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    profile: &'a str,
    units: Vec<ManifestEntry<'a>>,
    modules: Vec<ManifestEntry<'a>>,
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    name: &'a str,
    file: &'a str,
}

pub fn load_profile(profile: &str) -> Result<TargetProfile> {
    if !profile.ends_with(".json") {
        return Ok(TargetProfile::builtin(profile)?);
    }
    let json = fs::read_to_string(profile)
        .with_context(|| format!("could not read profile `{}`", profile))?;
    TargetProfile::from_json(&json).with_context(|| format!("invalid profile `{}`", profile))
}

/// Runs one invocation. Diagnostic reports go to `reports`.
pub fn run<W: Write>(args: &Args, mut reports: W) -> Result<Summary> {
    let file = args.input.display().to_string();
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("could not read `{}`", file))?;
    let reporter = Reporter::new(file.clone(), &source);

    if args.check {
        let checked = wrapgen::check(&source, &file);
        reporter.write_all(&checked.diagnostics, &mut reports, !args.no_color)?;
        return Ok(Summary::count(&checked.diagnostics));
    }

    let profile = load_profile(&args.profile)?;
    let generated = wrapgen::generate(&source, &file, &profile)?;
    reporter.write_all(&generated.diagnostics, &mut reports, !args.no_color)?;

    match &args.output {
        Some(dir) => {
            let written = write_bindings(dir, &profile, &generated.bindings)?;
            info!(files = written.len(), dir = %dir.display(), "wrote bindings");
        }
        None => print_bindings(io::stdout().lock(), &generated.bindings)?,
    }

    Ok(Summary {
        units: generated.bindings.units.len(),
        modules: generated.bindings.modules.len(),
        ..Summary::count(&generated.diagnostics)
    })
}

/// Writes every unit and module plus a `MANIFEST.json` listing them.
pub fn write_bindings(dir: &Path, profile: &TargetProfile, bindings: &Bindings) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("could not create `{}`", dir.display()))?;

    let mut written = vec![];
    let files = bindings
        .units
        .iter()
        .map(|unit| (&unit.file_name, &unit.code))
        .chain(
            bindings
                .modules
                .iter()
                .map(|module| (&module.file_name, &module.code)),
        );
    for (name, code) in files {
        let path = dir.join(name);
        fs::write(&path, code).with_context(|| format!("could not write `{}`", path.display()))?;
        debug!(path = %path.display(), "wrote unit");
        written.push(path);
    }

    let manifest = Manifest {
        profile: &profile.name,
        units: bindings
            .units
            .iter()
            .map(|unit| ManifestEntry {
                name: &unit.class,
                file: &unit.file_name,
            })
            .collect(),
        modules: bindings
            .modules
            .iter()
            .map(|module| ManifestEntry {
                name: &module.host_name,
                file: &module.file_name,
            })
            .collect(),
    };
    let path = dir.join("MANIFEST.json");
    fs::write(&path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("could not write `{}`", path.display()))?;
    written.push(path);

    Ok(written)
}

pub fn print_bindings<W: Write>(mut out: W, bindings: &Bindings) -> io::Result<()> {
    for unit in &bindings.units {
        writeln!(out, "{}", unit.code)?;
    }
    for module in &bindings.modules {
        writeln!(out, "{}", module.code)?;
    }
    Ok(())
}
