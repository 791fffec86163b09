use colored::Colorize;

use depot_store::{FormatLayout, LocalStore, RetentionWindow, VersionedStore};
use depot_types::Version;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = LocalStore::new(&cli.base_dir);
    let format = cli.format.as_format();
    let layout = match &cli.subdir {
        Some(subdir) => FormatLayout::with_subdir(format, subdir.as_str()),
        None => FormatLayout::new(format),
    };
    let json = matches!(cli.output, OutputFormat::Json);

    match cli.command {
        Command::Allocate(_) => cmd_allocate(json),
        Command::Paths(args) => cmd_paths(&store, &layout, args, json),
        Command::Latest(args) => cmd_latest(&store, &layout, args, json),
        Command::Versions(_) => cmd_versions(&store, &layout, json),
        Command::List(_) => cmd_list(&store, json),
        Command::Cleanup(args) => cmd_cleanup(&store, &layout, args, json),
    }
}

fn cmd_allocate(json: bool) -> anyhow::Result<()> {
    let version = Version::now();
    if json {
        println!("{}", serde_json::to_string(&version)?);
    } else {
        println!("{version}");
    }
    Ok(())
}

fn cmd_paths(
    store: &LocalStore,
    layout: &FormatLayout,
    args: PathsArgs,
    json: bool,
) -> anyhow::Result<()> {
    let version = args.version.as_deref().map(Version::parse).transpose()?;
    let names: Vec<&str> = args.names.iter().map(String::as_str).collect();
    let paths = store.create_paths(layout, &names, version)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }
    for (name, path) in &paths {
        println!("  {}  {}", name.bold(), path.display());
    }
    Ok(())
}

fn cmd_latest(
    store: &LocalStore,
    layout: &FormatLayout,
    args: LatestArgs,
    json: bool,
) -> anyhow::Result<()> {
    let names: Vec<&str> = args.names.iter().map(String::as_str).collect();
    let found = store.latest(layout, &names)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }
    if found.is_empty() {
        println!("No artifacts found.");
        return Ok(());
    }
    for (name, path) in &found {
        println!("  {}  {}", name.bold(), path.display());
    }
    for name in &names {
        if !found.contains_key(*name) {
            println!("  {}  {}", name.bold(), "missing".yellow());
        }
    }
    Ok(())
}

fn cmd_versions(store: &LocalStore, layout: &FormatLayout, json: bool) -> anyhow::Result<()> {
    let versions = store.versions(layout)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&versions)?);
        return Ok(());
    }
    if versions.is_empty() {
        println!("No versions.");
        return Ok(());
    }
    for (index, version) in versions.iter().enumerate() {
        if index == 0 {
            println!("* {}", version.to_string().green().bold());
        } else {
            println!("  {version}");
        }
    }
    Ok(())
}

fn cmd_list(store: &LocalStore, json: bool) -> anyhow::Result<()> {
    let inventory = store.list_all()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(());
    }
    if inventory.is_empty() {
        println!("No artifacts.");
        return Ok(());
    }
    for (name, generations) in &inventory {
        println!("{}", name.bold());
        for (version, path) in generations {
            println!("  {}  {}", version.to_string().yellow(), path.display());
        }
    }
    Ok(())
}

fn cmd_cleanup(
    store: &LocalStore,
    layout: &FormatLayout,
    args: CleanupArgs,
    json: bool,
) -> anyhow::Result<()> {
    let report = store.cleanup(layout, RetentionWindow::new(args.keep))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if report.versions_removed == 0 {
        println!("{} Nothing to remove.", "✓".green());
    } else {
        println!(
            "{} Removed {} stale version(s), {} deleted, {} failed.",
            "✓".green(),
            report.versions_removed,
            report.items_deleted,
            report.failures
        );
    }
    Ok(())
}
