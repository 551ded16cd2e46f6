use clap::Parser;
use std::path::PathBuf;
use vitrine::catalog;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The catalog file to validate (e.g., "watches.toml")
    path: Option<PathBuf>,

    /// List every entry found in the scanned catalog directories instead
    #[arg(short, long)]
    scan: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let entries = match (&args.path, args.scan) {
        (Some(path), _) => {
            let loaded = catalog::load_catalog_file(path)?;
            if let Some(name) = &loaded.name {
                println!("{name}");
            }
            loaded.entries
        }
        (None, true) => catalog::scan_entries(),
        (None, false) => {
            anyhow::bail!("pass a catalog file or --scan");
        }
    };

    for entry in &entries {
        match entry.children.len() {
            0 => println!("  {}  {}", entry.id, entry.label),
            n => println!("  {}  {} ({} variants)", entry.id, entry.label, n),
        }
    }
    println!("{} entries", entries.len());

    Ok(())
}
