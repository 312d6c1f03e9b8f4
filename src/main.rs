use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use imgdedup::cli::args::{Cli, Commands, CompletionShell, ConfigAction, OutputFormat};
use imgdedup::cli::output;
use imgdedup::common::config::{self, Config};
use imgdedup::common::format;
use imgdedup::duplicates::{scanner, CancelToken, EngineConfig, ScanReport, Session};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let filter = if cli.verbose {
        EnvFilter::new("imgdedup=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan {
            ref path,
            threshold,
            detailed,
            ref output,
        } => cmd_scan(&cli, path, threshold, detailed, output.as_deref()),

        Commands::Clean {
            ref path,
            threshold,
            no_dry_run,
            ref groups,
            yes,
        } => cmd_clean(&cli, path, threshold, no_dry_run, groups.as_deref(), yes),

        Commands::Config { ref action } => cmd_config(action),

        Commands::Completions { ref shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let shell = match shell {
                CompletionShell::Bash => clap_complete::Shell::Bash,
                CompletionShell::Zsh => clap_complete::Shell::Zsh,
                CompletionShell::Fish => clap_complete::Shell::Fish,
            };
            clap_complete::generate(shell, &mut cmd, "imgdedup", &mut std::io::stdout());
            Ok(())
        }
    }
}

// ─── Shared ───────────────────────────────────────────────────────────────────

/// Expand a leading `~` to the home directory
fn expand_path(path: &str) -> PathBuf {
    if path.starts_with('~') {
        let home = dirs::home_dir().unwrap_or_default();
        home.join(path.strip_prefix("~/").unwrap_or(path.strip_prefix('~').unwrap_or(path)))
    } else {
        PathBuf::from(path)
    }
}

/// `--quiet` wins, then `--format`, then the configured preference
fn resolve_format(cli: &Cli, config: &Config) -> OutputFormat {
    if cli.quiet {
        return OutputFormat::Quiet;
    }
    cli.format.unwrap_or(match config.output_format {
        config::OutputFormat::Human => OutputFormat::Human,
        config::OutputFormat::Json => OutputFormat::Json,
        config::OutputFormat::Quiet => OutputFormat::Quiet,
    })
}

fn engine_config(config: &Config, threshold: Option<u32>) -> EngineConfig {
    let mut engine = config.engine_config();
    if let Some(t) = threshold {
        engine.threshold = t;
    }
    engine
}

fn run_scan(root: &Path, engine: &EngineConfig, show_progress: bool) -> Result<ScanReport> {
    if show_progress {
        println!();
        println!(
            "  {} Scanning for duplicate images in: {}",
            "🔍",
            format::format_path(root).cyan()
        );
        println!(
            "  {} Similarity threshold: {} bits",
            "🖼️", engine.threshold
        );
        println!();
    }

    let pb = if show_progress {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} Hashing images... {msg}")?
                .progress_chars("━━░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress = |done: usize, total: usize| {
        if let Some(ref pb) = pb {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        }
    };

    let report = scanner::scan_with_progress(root, engine, &progress, &CancelToken::new())?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(report)
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

fn cmd_scan(
    cli: &Cli,
    path: &str,
    threshold: Option<u32>,
    detailed: bool,
    output_file: Option<&str>,
) -> Result<()> {
    let config = Config::load()?;
    let out = resolve_format(cli, &config);
    let engine = engine_config(&config, threshold);
    let root = expand_path(path);

    let report = run_scan(&root, &engine, out == OutputFormat::Human)?;
    let session = Session::from_report(report.clone(), engine);
    let snapshot = session.snapshot();

    match out {
        OutputFormat::Human => output::print_scan_results(&report, detailed),
        OutputFormat::Json => output::print_scan_json(&snapshot, &report),
        OutputFormat::Quiet => output::print_scan_quiet(&report),
    }

    if let Some(file) = output_file {
        let file = expand_path(file);
        snapshot.save(&file)?;
        if out == OutputFormat::Human {
            println!(
                "  {} Results saved to {}",
                "✓".green(),
                format::format_path(&file)
            );
        }
    }

    Ok(())
}

// ─── Clean ────────────────────────────────────────────────────────────────────

fn cmd_clean(
    cli: &Cli,
    path: &str,
    threshold: Option<u32>,
    no_dry_run: bool,
    groups: Option<&[usize]>,
    yes: bool,
) -> Result<()> {
    let config = Config::load()?;
    let out = resolve_format(cli, &config);
    let engine = engine_config(&config, threshold);
    let root = expand_path(path);

    let report = run_scan(&root, &engine, out == OutputFormat::Human)?;

    if report.groups.is_empty() {
        if out == OutputFormat::Human {
            println!("  {} No duplicates found!", "✨");
        }
        return Ok(());
    }

    if out == OutputFormat::Human {
        output::print_scan_results(&report, true);
    }

    // Printed group numbers are 1-based; a bad number never widens to "all"
    let selected = groups
        .unwrap_or_default()
        .iter()
        .map(|&g| match g.checked_sub(1) {
            Some(i) if i < report.groups.len() => Ok(i),
            _ => Err(anyhow::anyhow!(
                "No such group: {} (found {} groups)",
                g,
                report.groups.len()
            )),
        })
        .collect::<Result<Vec<usize>>>()?;

    let (count, bytes) = report
        .groups
        .iter()
        .enumerate()
        .filter(|(i, _)| selected.is_empty() || selected.contains(i))
        .fold((0usize, 0u64), |(n, b), (_, g)| {
            (n + g.delete().len(), b + g.space_saved())
        });

    // Confirm unless --yes or dry run
    if no_dry_run && !yes {
        print!(
            "\n  {} Delete {} duplicate files ({})? [y/N] ",
            "❓",
            count,
            format::format_size(bytes)
        );
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("  {} Cancelled", "✗".red());
            return Ok(());
        }
    }

    let mut session = Session::from_report(report, engine);
    session.set_dry_run(!no_dry_run);
    let result = session.delete_groups(&selected);

    match out {
        OutputFormat::Human => output::print_deletion_result(&result),
        OutputFormat::Json => output::print_deletion_json(&result),
        OutputFormat::Quiet => {
            println!(
                "{}  {}  {}",
                if result.dry_run { result.would_delete } else { result.deleted_count },
                format::format_size(if result.dry_run { result.would_free } else { result.bytes_freed }),
                result.error_count
            );
        }
    }

    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
            Ok(())
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("  {} Configuration reset to defaults", "✓".green());
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(key, value)?;
            config.save()?;
            println!("  {} Set {} = {}", "✓".green(), key, value);
            Ok(())
        }
    }
}
