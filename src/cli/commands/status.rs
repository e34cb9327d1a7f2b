//! `hdp status` command - Row counts per table

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Print counts as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let db_path = session.database_path();

    if !db_path.exists() {
        println!(
            "{} No database at {}",
            style("!").yellow(),
            style(db_path.display()).cyan()
        );
        println!("Run {} first", style("hdp import").yellow());
        return Ok(());
    }

    let store = session.open_store()?;
    let counts = store.counts().into_diagnostic()?;

    if args.json {
        let map: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|c| (c.kind.as_str().to_string(), c.rows.into()))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&map).into_diagnostic()?
        );
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Table", "Rows"]);
    for count in &counts {
        builder.push_record([count.kind.label().to_string(), count.rows.to_string()]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    let total: i64 = counts.iter().map(|c| c.rows).sum();
    if !global.quiet {
        println!();
        println!("Total records: {}", style(total).bold());
        println!("Database:      {}", style(db_path.display()).dim());
    }
    Ok(())
}
