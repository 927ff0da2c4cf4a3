use anyhow::{bail, Context, Result};
use glimmer_graphics::atlas::{
    page_image_path, page_manifest_path, read_manifest, read_page_count, scan_page_count,
};
use std::path::Path;

pub fn run(dir: &str, verbose: bool) -> Result<()> {
    let dir = Path::new(dir);
    if !dir.is_dir() {
        bail!("Atlas directory not found: {}", dir.display());
    }

    let count = read_page_count(dir)
        .with_context(|| format!("Failed to read page count in {}", dir.display()))?;
    let pages = match count {
        Some(count) => {
            println!("Atlas: {} ({} pages)", dir.display(), count);
            count
        }
        None => {
            let count = scan_page_count(dir);
            println!("Atlas: {} ({} pages, scanned)", dir.display(), count);
            count
        }
    };

    let mut total = 0;
    for page in 0..pages {
        let manifest = page_manifest_path(dir, page);
        if !page_image_path(dir, page).is_file() {
            println!("  page {}: missing image", page);
        }
        let sprites = match read_manifest(&manifest) {
            Ok(Some(sprites)) => sprites,
            Ok(None) => {
                println!("  page {}: no manifest", page);
                continue;
            }
            Err(e) => {
                println!("  page {}: invalid manifest: {}", page, e);
                continue;
            }
        };

        println!("  page {}: {} sprites", page, sprites.len());
        for sprite in &sprites {
            if verbose {
                println!(
                    "    {:<32} {:>4},{:<4} {}x{}",
                    sprite.name, sprite.x, sprite.y, sprite.width, sprite.height
                );
            } else {
                println!("    {}", sprite.name);
            }
        }
        total += sprites.len();
    }

    println!("Total: {} sprites", total);
    Ok(())
}
