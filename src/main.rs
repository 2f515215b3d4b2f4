use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use asset_relocator::document::{load_document, render_document, write_document};
use asset_relocator::{RelocationReport, RelocatorSettings, SoftFailure};

/// Rewrite upload URLs in a JSON configuration and copy the referenced files.
#[derive(Debug, Parser)]
#[command(name = "relocate-assets", version, about)]
struct Cli {
  /// JSON document to relocate. Defaults to `configPath` from the settings.
  config: Option<PathBuf>,
  /// Settings file (JSON or YAML). Discovered in the working directory when omitted.
  #[arg(long)]
  settings: Option<PathBuf>,
  /// Directory holding the uploaded files.
  #[arg(long)]
  source_dir: Option<PathBuf>,
  /// Directory the referenced files are copied into.
  #[arg(long)]
  dest_dir: Option<PathBuf>,
  /// Substring identifying upload references.
  #[arg(long)]
  pattern: Option<String>,
  /// Marker the filename follows inside a reference.
  #[arg(long)]
  marker: Option<String>,
  /// Prefix of the rewritten public path.
  #[arg(long)]
  replacement_prefix: Option<String>,
  /// Write the relocated document here instead of stdout.
  #[arg(short, long)]
  output: Option<PathBuf>,
  /// Wrap stdout output in __JSON_START__ / __JSON_END__ lines.
  #[arg(long, conflicts_with = "output")]
  framed: bool,
  /// Rewrite and report without copying anything.
  #[arg(long)]
  dry_run: bool,
  /// Exit with a failure status when any asset could not be relocated.
  #[arg(long)]
  strict: bool,
  /// Increase log verbosity (-v info, -vv debug).
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,
}

impl Cli {
  fn load_settings(&self) -> Result<RelocatorSettings> {
    let mut settings = match &self.settings {
      Some(path) => {
        let base = path.parent().map(PathBuf::from).unwrap_or_default();
        RelocatorSettings::from_path(path)?.resolve_paths(&base)
      }
      None => {
        let cwd = std::env::current_dir().context("failed to resolve working directory")?;
        RelocatorSettings::discover(&cwd)?
      }
    };

    if let Some(config) = &self.config {
      settings.config_path = config.clone();
    }
    if let Some(source_dir) = &self.source_dir {
      settings.source_dir = source_dir.clone();
    }
    if let Some(dest_dir) = &self.dest_dir {
      settings.dest_dir = dest_dir.clone();
    }
    if let Some(pattern) = &self.pattern {
      settings.pattern = pattern.clone();
    }
    if let Some(marker) = &self.marker {
      settings.marker = marker.clone();
    }
    if let Some(prefix) = &self.replacement_prefix {
      settings.replacement_prefix = prefix.clone();
    }

    Ok(settings)
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match run(&cli) {
    Ok(code) => code,
    Err(err) => {
      eprintln!("Error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn init_logging(verbosity: u8) {
  let default_level = match verbosity {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
    .format_timestamp(None)
    .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
  let settings = cli.load_settings()?;
  let relocator = settings.relocator()?.dry_run(cli.dry_run);

  let tree = load_document(&settings.config_path)?;
  let relocation = relocator
    .relocate(&tree)
    .with_context(|| format!("failed to relocate assets from {}", settings.config_path.display()))?;

  match &cli.output {
    Some(path) => write_document(path, &relocation.tree)?,
    None => {
      let rendered = render_document(&relocation.tree, cli.framed)?;
      io::stdout()
        .lock()
        .write_all(rendered.as_bytes())
        .context("failed to write document to stdout")?;
    }
  }

  print_report(&relocation.report, cli.dry_run);

  if cli.strict && relocation.report.has_soft_failures() {
    return Ok(ExitCode::FAILURE);
  }
  Ok(ExitCode::SUCCESS)
}

fn print_report(report: &RelocationReport, dry_run: bool) {
  let verb = if dry_run { "would copy" } else { "copied" };
  eprintln!("{verb} {} asset(s)", report.copied_count());

  let missing = report.missing_assets();
  if !missing.is_empty() {
    eprintln!("missing assets ({}):", missing.len());
    for path in missing {
      eprintln!("  {}", path.display());
    }
  }

  for failure in &report.failures {
    if !matches!(failure, SoftFailure::AssetMissing { .. }) {
      eprintln!("warning: {failure}");
    }
  }
}

#[cfg(test)]
mod tests {
  use std::ffi::OsString;

  use super::*;

  #[test]
  fn flags_override_settings_file() {
    let temp = tempfile::tempdir().unwrap();
    let settings_path = temp.path().join("relocator.config.json");
    std::fs::write(
      &settings_path,
      r#"{ "sourceDir": "uploads", "destDir": "out", "replacementPrefix": "/a/" }"#,
    )
    .unwrap();

    let args: Vec<OsString> = vec![
      "relocate-assets".into(),
      "site.json".into(),
      "--settings".into(),
      settings_path.clone().into_os_string(),
      "--replacement-prefix".into(),
      "/b/".into(),
    ];
    let cli = Cli::try_parse_from(args).unwrap();
    let settings = cli.load_settings().unwrap();

    assert_eq!(settings.config_path, PathBuf::from("site.json"));
    assert_eq!(settings.source_dir, temp.path().join("uploads"));
    assert_eq!(settings.dest_dir, temp.path().join("out"));
    assert_eq!(settings.replacement_prefix, "/b/");
  }

  #[test]
  fn counts_verbosity_flags() {
    let cli = Cli::try_parse_from(["relocate-assets", "-vv", "--dry-run", "--strict"]).unwrap();
    assert_eq!(cli.verbose, 2);
    assert!(cli.dry_run);
    assert!(cli.strict);
    assert!(cli.config.is_none());
  }

  #[test]
  fn framed_output_only_applies_to_stdout() {
    let result =
      Cli::try_parse_from(["relocate-assets", "--framed", "--output", "site.json"]);
    assert!(result.is_err());
    assert!(Cli::try_parse_from(["relocate-assets", "--framed"]).is_ok());
  }
}
