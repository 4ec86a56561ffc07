use std::path::Path;

use boxtract::{load_regions, save_regions};
use boxtract_core::{Rect, RegionStore};

use crate::cli::RegionsCommand;

/// Run a `regions` subcommand.
pub fn run(command: &RegionsCommand) -> Result<(), i32> {
    match command {
        RegionsCommand::Add { file, name, coords } => add(file, name, coords),
        RegionsCommand::List { file } => list(file),
        RegionsCommand::Remove { file, name } => remove(file, name),
    }
}

/// Load the region file, or start empty if it does not exist yet.
fn load_or_new(file: &Path) -> Result<RegionStore, i32> {
    if !file.exists() {
        return Ok(RegionStore::new());
    }
    load_regions(file).map_err(|e| {
        eprintln!("Error: failed to load region file {}: {e}", file.display());
        1
    })
}

fn save(file: &Path, store: &RegionStore) -> Result<(), i32> {
    save_regions(file, store).map_err(|e| {
        eprintln!("Error: failed to write region file {}: {e}", file.display());
        1
    })
}

fn add(file: &Path, name: &str, coords: &[f64]) -> Result<(), i32> {
    let name = name.trim();
    if name.is_empty() {
        eprintln!("Error: region name must not be empty");
        return Err(1);
    }
    let rect = Rect::normalized(coords[0], coords[1], coords[2], coords[3]);
    if !rect.is_finite() {
        eprintln!("Error: region coordinates must be finite numbers");
        return Err(1);
    }

    let mut store = load_or_new(file)?;
    store.put(name, rect);
    save(file, &store)?;
    println!(
        "Saved region '{name}' ({} total) to {}",
        store.len(),
        file.display()
    );
    Ok(())
}

fn list(file: &Path) -> Result<(), i32> {
    let store = load_or_new(file)?;
    if store.is_empty() {
        println!("No regions defined in {}", file.display());
        return Ok(());
    }
    for (name, rect) in store.all() {
        println!(
            "{name}: [{}, {}, {}, {}]",
            rect.x0, rect.y0, rect.x1, rect.y1
        );
    }
    Ok(())
}

fn remove(file: &Path, name: &str) -> Result<(), i32> {
    let mut store = load_or_new(file)?;
    if store.remove(name).is_none() {
        eprintln!("Error: no region named '{name}' in {}", file.display());
        return Err(1);
    }
    save(file, &store)?;
    println!("Removed region '{name}' ({} left)", store.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_creates_file_and_region() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("r.json");
        add(&file, "Title", &[50.0, 650.0, 550.0, 750.0]).unwrap();

        let store = load_regions(&file).unwrap();
        assert_eq!(
            store.get("Title"),
            Some(&Rect::normalized(50.0, 650.0, 550.0, 750.0))
        );
    }

    #[test]
    fn add_rejects_blank_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("r.json");
        assert_eq!(add(&file, "   ", &[0.0, 0.0, 1.0, 1.0]), Err(1));
        assert!(!file.exists());
    }

    #[test]
    fn add_rejects_non_finite_coords() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("r.json");
        assert_eq!(add(&file, "x", &[0.0, f64::NAN, 1.0, 1.0]), Err(1));
    }

    #[test]
    fn remove_missing_region_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("r.json");
        add(&file, "Keep", &[0.0, 0.0, 1.0, 1.0]).unwrap();
        assert_eq!(remove(&file, "Gone"), Err(1));
        assert!(load_regions(&file).unwrap().get("Keep").is_some());
    }

    #[test]
    fn remove_deletes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("r.json");
        add(&file, "A", &[0.0, 0.0, 1.0, 1.0]).unwrap();
        add(&file, "B", &[2.0, 2.0, 3.0, 3.0]).unwrap();
        remove(&file, "A").unwrap();

        let store = load_regions(&file).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("B").is_some());
    }
}
