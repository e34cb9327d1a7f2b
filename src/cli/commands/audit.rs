//! `hdp audit` command - Data-quality audit and reports

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::audit::{self, report, DataAuditReport};
use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;

/// Recommendations echoed to the terminal
const SHOWN_RECOMMENDATIONS: usize = 5;

#[derive(clap::Args, Debug)]
pub struct AuditArgs {
    /// Markdown report path (default: report_markdown from config)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// JSON report path (default: report_json from config)
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Print the summary only, write no report files
    #[arg(long)]
    pub no_write: bool,
}

pub fn run(args: AuditArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let store = session.open_store()?;

    let report = audit::run(&store).into_diagnostic()?;

    if !args.no_write {
        let (default_md, default_json) = session.report_paths();
        let markdown = args.output.unwrap_or(default_md);
        let json = args.json.unwrap_or(default_json);
        report::write_reports(&report, &markdown, &json).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Wrote {}",
                style("✓").green(),
                style(markdown.display()).cyan()
            );
            println!(
                "{} Wrote {}",
                style("✓").green(),
                style(json.display()).cyan()
            );
            println!();
        }
    }

    if !global.quiet {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &DataAuditReport) {
    println!("{}", style("Data Audit Summary").bold().underlined());
    println!("  Total records:     {}", style(report.total_records()).bold());
    println!("  Total data points: {}", report.total_data_points);

    let score = report.data_quality_score;
    let score_text = audit::pct(score);
    let score_styled = if score >= audit::QUALITY_THRESHOLD {
        style(score_text).green()
    } else {
        style(score_text).yellow()
    };
    println!("  Quality score:     {}", score_styled);
    println!("  Issues found:      {}", report.issues.len());

    if report.recommendations.is_empty() {
        return;
    }
    println!();
    println!("{}", style("Top recommendations").bold());
    for (i, rec) in report
        .recommendations
        .iter()
        .take(SHOWN_RECOMMENDATIONS)
        .enumerate()
    {
        println!("  {} {}", style(format!("{}.", i + 1)).dim(), rec);
    }
    if report.recommendations.len() > SHOWN_RECOMMENDATIONS {
        println!(
            "  {} more in the report",
            report.recommendations.len() - SHOWN_RECOMMENDATIONS
        );
    }
}
