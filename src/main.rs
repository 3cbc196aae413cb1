mod bills;
mod export;
mod models;
mod run;
mod stats;
mod store;

use anyhow::Result;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut store = store::Store::open(&data_dir()?)?;

    match args.len() {
        0 | 1 => run::summary(&[], &store),
        _ => run::as_cli(&args, &mut store),
    }
}

fn data_dir() -> Result<std::path::PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "bolso", "Bolso")
        .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory for this platform"))?;
    Ok(dirs.data_dir().to_path_buf())
}
