//! Texture atlas file layout
//!
//! Each atlas directory holds numbered pages: `atlas-N.png` with a matching
//! `atlas-N.xml` manifest listing `<sprite x y width height name/>` rectangles,
//! plus an `atlas.count` file containing the page count as one big-endian i32.

use byteorder::{BigEndian, ReadBytesExt};
use glimmer_core::{GlimmerError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the page count sidecar
pub const COUNT_FILE: &str = "atlas.count";

/// One sprite rectangle from an atlas manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRect {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub fn page_image_path(dir: &Path, page: u32) -> PathBuf {
    dir.join(format!("atlas-{page}.png"))
}

pub fn page_manifest_path(dir: &Path, page: u32) -> PathBuf {
    dir.join(format!("atlas-{page}.xml"))
}

/// Read the page count of an atlas directory.
/// Returns `Ok(None)` if the directory has no `atlas.count`.
pub fn read_page_count(dir: &Path) -> Result<Option<u32>> {
    let mut file = match File::open(dir.join(COUNT_FILE)) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let count = file.read_i32::<BigEndian>()?;
    Ok(Some(count.max(0) as u32))
}

/// Count pages by scanning `atlas-0.png`, `atlas-1.png`, ... until one is missing
pub fn scan_page_count(dir: &Path) -> u32 {
    let mut count = 0;
    while page_image_path(dir, count).is_file() {
        count += 1;
    }
    count
}

/// One past the highest page number with an `atlas-N.png` in `dir`, gaps included
pub fn present_page_count(dir: &Path) -> u32 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let page = name.to_str()?.strip_prefix("atlas-")?.strip_suffix(".png")?;
            page.parse::<u32>().ok()
        })
        .max()
        .map_or(0, |page| page.saturating_add(1))
}

/// Read and parse a page manifest. Returns `Ok(None)` if the file is missing.
pub fn read_manifest(path: &Path) -> Result<Option<Vec<SpriteRect>>> {
    let xml = match fs::read_to_string(path) {
        Ok(xml) => xml,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    parse_manifest(&xml, &path.display().to_string()).map(Some)
}

/// Parse the `<sprite>` entries of a manifest.
///
/// Entries with a missing or non-numeric attribute are skipped with a warning;
/// malformed XML fails the whole manifest.
pub fn parse_manifest(xml: &str, origin: &str) -> Result<Vec<SpriteRect>> {
    let mut reader = Reader::from_str(xml);
    let mut sprites = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sprite" => {
                let mut name = None;
                let mut dims = [None; 4];

                for attr in e.attributes() {
                    let attr = attr.map_err(|err| manifest_error(origin, err))?;
                    let value = attr
                        .unescape_value()
                        .map_err(|err| manifest_error(origin, err))?;
                    let slot = match attr.key.as_ref() {
                        b"name" => {
                            name = Some(value.into_owned());
                            continue;
                        }
                        b"x" => 0,
                        b"y" => 1,
                        b"width" => 2,
                        b"height" => 3,
                        _ => continue,
                    };
                    dims[slot] = value.trim().parse::<u32>().ok();
                }

                match (name, dims) {
                    (Some(name), [Some(x), Some(y), Some(width), Some(height)]) => {
                        sprites.push(SpriteRect {
                            name,
                            x,
                            y,
                            width,
                            height,
                        });
                    }
                    (name, _) => {
                        log::warn!(
                            "Skipping incomplete sprite entry {:?} in {}",
                            name.unwrap_or_default(),
                            origin
                        );
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(manifest_error(origin, err)),
        }
    }

    Ok(sprites)
}

fn manifest_error(origin: &str, err: impl std::fmt::Display) -> GlimmerError {
    GlimmerError::AtlasManifest {
        path: origin.to_string(),
        reason: err.to_string(),
    }
}
