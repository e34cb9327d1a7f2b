//! `hdp import` command - Load CSV exports into the database

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{truncate_str, Session};
use crate::cli::GlobalOpts;
use crate::core::store::DataStore;
use crate::import::{self, ImportContext, ImportResult, ImporterKind, SourceFile};

/// Errors printed per importer before eliding the rest
const SHOWN_ERRORS: usize = 3;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Run a single importer (developers, projects, properties, permits,
    /// market-metrics, construction, market-intelligence, quality-of-life,
    /// demographics). Default: all, in dependency order
    pub importer: Option<ImporterKind>,

    /// Read these files instead of the configured sources
    #[arg(long = "file", short = 'f', requires = "importer")]
    pub files: Vec<PathBuf>,

    /// Category tag for market-intelligence rows read with --file
    #[arg(long, requires = "files")]
    pub category: Option<String>,

    /// Parse and normalize everything but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Exit non-zero when any importer reports errors
    #[arg(long)]
    pub strict: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;

    if let Some(missing) = args.files.iter().find(|p| !p.is_file()) {
        return Err(miette::miette!("file not found: {}", missing.display()));
    }

    let mut store = if args.dry_run {
        DataStore::open_in_memory().into_diagnostic()?
    } else {
        session.open_store()?
    };

    let explicit: Option<Vec<SourceFile>> = if args.files.is_empty() {
        None
    } else {
        Some(
            args.files
                .iter()
                .map(|p| {
                    let file = SourceFile::new(p);
                    match &args.category {
                        Some(c) => file.with_category(c),
                        None => file,
                    }
                })
                .collect(),
        )
    };

    let mut ctx = ImportContext::new(&mut store, session.data_root(), &session.config);
    let results = match args.importer {
        Some(kind) => vec![import::run_one(&mut ctx, kind, explicit)],
        None => import::run_all(&mut ctx),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).into_diagnostic()?
        );
    } else {
        print_results(&results, args.dry_run, global.quiet);
    }

    let failed = results.iter().filter(|r| !r.success).count();
    if args.strict && failed > 0 {
        return Err(miette::miette!(
            "{} importer(s) reported errors",
            failed
        ));
    }
    Ok(())
}

fn print_results(results: &[ImportResult], dry_run: bool, quiet: bool) {
    if dry_run && !quiet {
        println!(
            "{} Dry run: nothing was written",
            style("→").blue()
        );
        println!();
    }

    for result in results {
        if quiet && result.success {
            continue;
        }
        let mark = if result.success {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!(
            "{} {}: {} imported ({} created, {} updated) from {} file(s)",
            mark,
            style(&result.data_type).cyan(),
            result.records_imported,
            result.records_created,
            result.records_updated,
            result.files_read
        );

        if !result.errors.is_empty() {
            println!("   {} {}", style("Errors:").red(), result.errors.len());
            for error in result.errors.iter().take(SHOWN_ERRORS) {
                println!("     - {}", truncate_str(error, 120));
            }
            if result.errors.len() > SHOWN_ERRORS {
                println!(
                    "     ... and {} more errors",
                    result.errors.len() - SHOWN_ERRORS
                );
            }
        }
    }

    let total: usize = results.iter().map(|r| r.records_imported).sum();
    let errors: usize = results.iter().map(|r| r.errors.len()).sum();
    if !quiet {
        println!();
        println!(
            "Total records imported: {}",
            style(total).bold()
        );
    }
    if !quiet || errors > 0 {
        println!("Total errors: {}", style(errors).bold());
    }
}
