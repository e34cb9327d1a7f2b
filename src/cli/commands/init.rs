//! `hdp init` command - Initialize a new workspace

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::core::workspace::{Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite the config of an existing workspace
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    match Workspace::init(&path, args.force) {
        Ok(workspace) => {
            println!(
                "{} Initialized hdp workspace at {}",
                style("✓").green(),
                style(workspace.root().display()).cyan()
            );
            println!();
            print_structure(workspace.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Copy the CSV exports under {}",
                style("1.").dim(),
                style("data/").yellow()
            );
            println!("  {} Load everything", style("hdp import").yellow());
            println!("  {} Check data quality", style("hdp audit").yellow());
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(root)) => {
            println!(
                "{} hdp workspace already exists at {}",
                style("!").yellow(),
                style(root.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("hdp init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    for entry in [".hdp/", ".hdp/config.yaml", ".hdp/.gitignore"] {
        if root.join(entry).exists() {
            println!("  {}", style(entry).dim());
        }
    }
}
