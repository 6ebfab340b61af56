//! Icon asset resolution
//!
//! Prototype icons are declared as mod-relative paths such as
//! `__base__/graphics/icons/iron-plate.png`, where the first segment names the
//! data directory the file lives in.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use log::debug;

const PLACEHOLDER_SIZE: u32 = 32;
/// Colour reported for entities without an icon.
pub const LIGHT_GRAY: Rgba<u8> = Rgba([211, 211, 211, 255]);

/// A decoded icon, cheap to clone and shared by every prototype using it.
#[derive(Clone)]
pub struct Icon {
    path: Option<PathBuf>,
    image: Arc<RgbaImage>,
}

impl Icon {
    pub fn new(path: PathBuf, image: RgbaImage) -> Self {
        Self {
            path: Some(path),
            image: Arc::new(image),
        }
    }

    /// The stand-in drawn for unresolved icons: a grey and magenta checkerboard.
    pub fn placeholder() -> Self {
        let image = RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgba([96, 96, 96, 255])
            } else {
                Rgba([255, 0, 255, 255])
            }
        });
        Self {
            path: None,
            image: Arc::new(image),
        }
    }

    /// Resolved file path, `None` for the placeholder.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn is_placeholder(&self) -> bool {
        self.path.is_none()
    }
}

impl fmt::Debug for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Icon")
            .field("path", &self.path)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

/// Finds and decodes icon files across the known data directories.
pub struct IconResolver {
    dirs: Vec<PathBuf>,
    cache: HashMap<PathBuf, Option<Icon>>,
}

impl IconResolver {
    /// `dirs` must be in ingestion order: core, base, then mods.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            cache: HashMap::new(),
        }
    }

    /// Map a nominal icon path to a file path without touching image data.
    ///
    /// A path that exists relative to the working directory is used as is.
    /// Otherwise the first segment, stripped of its `_` markers, must equal the
    /// final component of one of the data directories; the remaining segments
    /// are joined beneath that directory.
    pub fn locate(&self, nominal: &str) -> Option<PathBuf> {
        if nominal.is_empty() {
            return None;
        }

        let literal = Path::new(nominal);
        if literal.is_file() {
            return Some(literal.to_path_buf());
        }

        let mut segments = nominal.split('/');
        let root = segments.next()?.trim_matches('_');
        let dir = self
            .dirs
            .iter()
            .find(|d| d.file_name().and_then(|n| n.to_str()) == Some(root))?;

        // The first segment names the directory itself
        Some(segments.fold(dir.clone(), |path, segment| path.join(segment)))
    }

    /// Locate and decode an icon. `None` means the caller should use the
    /// placeholder.
    pub fn resolve(&mut self, nominal: &str) -> Option<Icon> {
        let Some(path) = self.locate(nominal) else {
            debug!("No data directory for icon {}", nominal);
            return None;
        };

        if let Some(cached) = self.cache.get(&path) {
            return cached.clone();
        }

        let icon = match image::open(&path) {
            Ok(decoded) => Some(Icon::new(path.clone(), decoded.to_rgba8())),
            Err(e) => {
                debug!("Failed to decode icon {}: {}", path.display(), e);
                None
            }
        };
        self.cache.insert(path, icon.clone());
        icon
    }
}

/// Average icon colours, memoized by resolved icon path.
#[derive(Debug, Default)]
pub struct IconColours {
    cache: HashMap<PathBuf, Rgba<u8>>,
}

impl IconColours {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean colour of the icon lightened half-way to white, [`LIGHT_GRAY`] when
    /// there is no icon.
    pub fn colour(&mut self, icon: Option<&Icon>) -> Rgba<u8> {
        let Some(icon) = icon else {
            return LIGHT_GRAY;
        };
        let Some(path) = icon.path() else {
            return average_colour(icon.image());
        };

        if let Some(colour) = self.cache.get(path) {
            return *colour;
        }
        let colour = average_colour(icon.image());
        self.cache.insert(path.to_path_buf(), colour);
        colour
    }
}

fn average_colour(image: &RgbaImage) -> Rgba<u8> {
    let mut sums = [0u64; 3];
    let mut weight = 0u64;

    for pixel in image.pixels() {
        let alpha = pixel[3] as u64;
        for (sum, channel) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += *channel as u64 * alpha;
        }
        weight += alpha;
    }

    if weight == 0 {
        return LIGHT_GRAY;
    }

    let lighten = |sum: u64| {
        let c = (sum / weight) as u8;
        c + (255 - c) / 2
    };
    Rgba([lighten(sums[0]), lighten(sums[1]), lighten(sums[2]), 255])
}
