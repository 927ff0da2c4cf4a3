//! Texture manager - resolves logical names, streaming atlas pages on demand

use crate::atlas;
use crate::texture::Texture;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Extension stripped from requested names and appended for direct loads
pub const IMAGE_EXTENSION: &str = ".png";

/// Atlas paging state for one registered directory
#[derive(Debug)]
struct AtlasDirectory {
    /// Key prefix, empty or ending in `/`
    prefix: String,
    next_page: u32,
    page_count: Option<u32>,
}

/// Cache of textures keyed by logical name (`directory/name`, no extension).
///
/// Names are resolved by trying a standalone image first and then walking the
/// atlas pages of the owning directory until the name shows up. Pages are
/// loaded at most once; a page whose image cannot be decoded is skipped for
/// good.
pub struct TextureManager {
    root: PathBuf,
    textures: HashMap<String, Texture>,
    directories: Vec<AtlasDirectory>,
}

impl TextureManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: HashMap::new(),
            directories: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register an atlas directory relative to the root. Duplicates are ignored.
    pub fn add_directory(&mut self, directory: &str) {
        let prefix = normalize_directory(directory);
        if self.directories.iter().any(|d| d.prefix == prefix) {
            return;
        }
        self.directories.push(AtlasDirectory {
            prefix,
            next_page: 0,
            page_count: None,
        });
    }

    /// Register a texture under a logical name, replacing any previous entry
    pub fn insert(&mut self, name: &str, texture: Texture) {
        self.textures.insert(canonical_key(name).to_string(), texture);
    }

    /// Whether a name is already resolved (never triggers loading)
    pub fn is_loaded(&self, name: &str) -> bool {
        self.textures.contains_key(canonical_key(name))
    }

    pub fn loaded_count(&self) -> usize {
        self.textures.len()
    }

    /// Resolve a texture by its full logical name, e.g. `"effects/rain"`
    pub fn texture(&mut self, name: &str) -> Option<Texture> {
        let key = canonical_key(name).to_string();
        if let Some(texture) = self.textures.get(&key) {
            return Some(texture.clone());
        }
        if let Some(texture) = self.load_standalone(&key) {
            return Some(texture);
        }

        let Some(index) = self.directory_for(&key) else {
            log::debug!("No atlas directory registered for texture '{}'", key);
            return None;
        };
        self.scan_directory(index, &key)
    }

    /// Resolve `name` inside a specific registered directory
    pub fn texture_in(&mut self, directory: &str, name: &str) -> Option<Texture> {
        let prefix = normalize_directory(directory);
        let key = format!("{}{}", prefix, canonical_key(name));
        if let Some(texture) = self.textures.get(&key) {
            return Some(texture.clone());
        }
        if let Some(texture) = self.load_standalone(&key) {
            return Some(texture);
        }

        let index = self.directories.iter().position(|d| d.prefix == prefix)?;
        self.scan_directory(index, &key)
    }

    /// Load exactly one more atlas page, walking directories in registration
    /// order. Returns overall progress in `[0, 1]`.
    pub fn load_remaining(&mut self) -> f32 {
        for index in 0..self.directories.len() {
            if self.has_pending_pages(index) {
                self.load_next_page(index);
                break;
            }
        }
        self.progress()
    }

    /// Fraction of all known atlas pages already loaded or skipped
    pub fn progress(&mut self) -> f32 {
        let mut loaded = 0u64;
        let mut total = 0u64;
        for index in 0..self.directories.len() {
            let count = self.page_count(index);
            let dir = &self.directories[index];
            total += count as u64;
            loaded += dir.next_page.min(count) as u64;
        }
        if total == 0 {
            1.0
        } else {
            loaded as f32 / total as f32
        }
    }

    pub fn is_fully_loaded(&mut self) -> bool {
        (0..self.directories.len()).all(|index| !self.has_pending_pages(index))
    }

    fn load_standalone(&mut self, key: &str) -> Option<Texture> {
        let path = self.root.join(format!("{key}{IMAGE_EXTENSION}"));
        if !path.is_file() {
            return None;
        }
        match Texture::load(&path) {
            Ok(texture) => {
                self.textures.insert(key.to_string(), texture.clone());
                Some(texture)
            }
            Err(e) => {
                log::warn!("Failed to load texture '{}': {}", key, e);
                None
            }
        }
    }

    /// Longest registered prefix of `key`
    fn directory_for(&self, key: &str) -> Option<usize> {
        self.directories
            .iter()
            .enumerate()
            .filter(|(_, d)| key.starts_with(&d.prefix))
            .max_by_key(|(_, d)| d.prefix.len())
            .map(|(index, _)| index)
    }

    fn scan_directory(&mut self, index: usize, key: &str) -> Option<Texture> {
        loop {
            if let Some(texture) = self.textures.get(key) {
                return Some(texture.clone());
            }
            if !self.has_pending_pages(index) {
                log::debug!("Texture '{}' not found in any atlas page", key);
                return None;
            }
            self.load_next_page(index);
        }
    }

    fn has_pending_pages(&mut self, index: usize) -> bool {
        let count = self.page_count(index);
        self.directories[index].next_page < count
    }

    fn page_count(&mut self, index: usize) -> u32 {
        if let Some(count) = self.directories[index].page_count {
            return count;
        }
        let dir_path = self.directory_path(index);
        let count = match atlas::read_page_count(&dir_path) {
            Ok(Some(declared)) => {
                let present = atlas::present_page_count(&dir_path);
                if declared > present {
                    log::warn!(
                        "{} in {} declares {} pages, only {} present",
                        atlas::COUNT_FILE,
                        dir_path.display(),
                        declared,
                        present
                    );
                }
                declared.min(present)
            }
            Ok(None) => atlas::scan_page_count(&dir_path),
            Err(e) => {
                log::warn!(
                    "Unreadable {} in {}: {}",
                    atlas::COUNT_FILE,
                    dir_path.display(),
                    e
                );
                atlas::scan_page_count(&dir_path)
            }
        };
        self.directories[index].page_count = Some(count);
        count
    }

    fn directory_path(&self, index: usize) -> PathBuf {
        let prefix = self.directories[index].prefix.trim_end_matches('/');
        if prefix.is_empty() {
            self.root.clone()
        } else {
            self.root.join(prefix)
        }
    }

    fn load_next_page(&mut self, index: usize) {
        let dir_path = self.directory_path(index);
        let dir = &mut self.directories[index];
        let page = dir.next_page;
        dir.next_page += 1;
        let prefix = dir.prefix.clone();

        let image_path = atlas::page_image_path(&dir_path, page);
        let page_texture = match Texture::load(&image_path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("Skipping atlas page {}: {}", image_path.display(), e);
                return;
            }
        };

        let sprites = match atlas::read_manifest(&atlas::page_manifest_path(&dir_path, page)) {
            Ok(Some(sprites)) => sprites,
            Ok(None) => return,
            Err(e) => {
                log::warn!("{}", e);
                return;
            }
        };

        let mut registered = 0;
        for rect in sprites {
            let Some(region) = page_texture.sub_texture(rect.x, rect.y, rect.width, rect.height)
            else {
                log::warn!(
                    "Sprite '{}' lies outside atlas page {}",
                    rect.name,
                    image_path.display()
                );
                continue;
            };
            let key = format!("{}{}", prefix, canonical_key(&rect.name));
            self.textures.insert(key, region);
            registered += 1;
        }
        log::debug!(
            "Loaded atlas page {} ({} sprites)",
            image_path.display(),
            registered
        );
    }
}

/// Strip a trailing image extension
fn canonical_key(name: &str) -> &str {
    name.strip_suffix(IMAGE_EXTENSION).unwrap_or(name)
}

fn normalize_directory(directory: &str) -> String {
    let trimmed = directory.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::fs;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("glimmer_textures_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write `atlas-N.png` (32x16, two 16x16 halves) and its manifest
    fn write_page(dir: &Path, page: u32, names: [&str; 2]) {
        let img = RgbaImage::from_fn(32, 16, |x, _| {
            if x < 16 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        img.save(atlas::page_image_path(dir, page)).unwrap();
        let xml = format!(
            r#"<sprites>
  <sprite x="0" y="0" width="16" height="16" name="{}"/>
  <sprite x="16" y="0" width="16" height="16" name="{}"/>
</sprites>"#,
            names[0], names[1]
        );
        fs::write(atlas::page_manifest_path(dir, page), xml).unwrap();
    }

    fn write_count(dir: &Path, count: i32) {
        fs::write(dir.join(atlas::COUNT_FILE), count.to_be_bytes()).unwrap();
    }

    #[test]
    fn resolves_names_lazily_page_by_page() {
        let root = temp_dir();
        let effects = root.join("effects");
        fs::create_dir_all(&effects).unwrap();
        write_page(&effects, 0, ["rain", "splash"]);
        write_page(&effects, 1, ["smoke", "spark"]);
        write_count(&effects, 2);

        let mut manager = TextureManager::new(&root);
        manager.add_directory("effects/");

        let rain = manager.texture("effects/rain.png").unwrap();
        assert_eq!((rain.width(), rain.height()), (16, 16));
        assert!(manager.is_loaded("effects/splash"));
        assert!(!manager.is_loaded("effects/smoke"));
        assert!((manager.progress() - 0.5).abs() < 1e-6);

        let smoke = manager.texture_in("effects", "smoke").unwrap();
        assert_eq!(smoke.pixel(0, 0), Some(Rgba([255, 0, 0, 255])));
        assert!(manager.is_fully_loaded());

        let spark = manager.texture("effects/spark").unwrap();
        assert_eq!(spark.origin(), (16, 0));
        assert!(spark.shares_image_with(&smoke));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn unknown_names_stay_missing() {
        let root = temp_dir();
        write_page(&root, 0, ["a", "b"]);
        write_count(&root, 1);

        let mut manager = TextureManager::new(&root);
        manager.add_directory("");

        assert!(manager.texture("nope").is_none());
        assert!(manager.texture("nope").is_none());
        assert!(manager.texture("a").is_some());
        assert!(manager.texture("unregistered/a").is_none());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn standalone_file_wins_over_atlas() {
        let root = temp_dir();
        RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 4]))
            .save(root.join("cursor.png"))
            .unwrap();

        let mut manager = TextureManager::new(&root);
        let cursor = manager.texture("cursor.png").unwrap();
        assert_eq!((cursor.width(), cursor.height()), (4, 2));
        assert!(manager.is_loaded("cursor"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn load_remaining_is_incremental() {
        let root = temp_dir();
        let gui = root.join("gui");
        let chars = root.join("chars");
        fs::create_dir_all(&gui).unwrap();
        fs::create_dir_all(&chars).unwrap();
        write_page(&gui, 0, ["button", "frame"]);
        write_count(&gui, 1);
        write_page(&chars, 0, ["human", "elf"]);
        write_page(&chars, 1, ["dwarf", "orc"]);
        write_page(&chars, 2, ["lizard", "halfling"]);
        write_count(&chars, 3);

        let mut manager = TextureManager::new(&root);
        manager.add_directory("gui");
        manager.add_directory("chars");
        manager.add_directory("chars");
        assert_eq!(manager.progress(), 0.0);

        assert!((manager.load_remaining() - 0.25).abs() < 1e-6);
        assert!(manager.is_loaded("gui/frame"));
        assert!(!manager.is_loaded("chars/human"));

        assert!((manager.load_remaining() - 0.5).abs() < 1e-6);
        assert!((manager.load_remaining() - 0.75).abs() < 1e-6);
        assert!((manager.load_remaining() - 1.0).abs() < 1e-6);
        assert!(manager.is_fully_loaded());
        assert_eq!(manager.loaded_count(), 8);

        // Nothing left to load
        assert!((manager.load_remaining() - 1.0).abs() < 1e-6);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_page_image_is_skipped() {
        let root = temp_dir();
        // Page 0 has only a manifest, page 1 is complete
        fs::write(
            atlas::page_manifest_path(&root, 0),
            r#"<sprites><sprite x="0" y="0" width="1" height="1" name="lost"/></sprites>"#,
        )
        .unwrap();
        write_page(&root, 1, ["found", "other"]);
        write_count(&root, 2);

        let mut manager = TextureManager::new(&root);
        manager.add_directory("/");

        assert!(manager.texture("lost").is_none());
        assert!(manager.is_loaded("found"));
        assert!(manager.is_fully_loaded());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn corrupt_page_count_is_capped() {
        let root = temp_dir();
        write_page(&root, 0, ["first", "second"]);
        write_page(&root, 2, ["fifth", "sixth"]);
        write_count(&root, i32::MAX);

        let mut manager = TextureManager::new(&root);
        manager.add_directory("");

        assert!(manager.texture("unknown").is_none());
        assert!(manager.is_fully_loaded());
        assert!(manager.is_loaded("first"));
        // Page 1 is missing and skipped, page 2 still loads
        assert!(manager.is_loaded("sixth"));
        assert_eq!(manager.progress(), 1.0);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn page_count_is_scanned_without_count_file() {
        let root = temp_dir();
        write_page(&root, 0, ["first", "second"]);
        write_page(&root, 1, ["third", "fourth"]);
        // Page 1 has no manifest: its sprites stay unknown but the page counts
        fs::remove_file(atlas::page_manifest_path(&root, 1)).unwrap();

        let mut manager = TextureManager::new(&root);
        manager.add_directory("");

        assert!(manager.texture("third").is_none());
        assert!(manager.is_fully_loaded());
        assert!(manager.texture("second").is_some());

        let _ = fs::remove_dir_all(&root);
    }
}
