use std::path::{Path, PathBuf};

/// Shown whenever a person image is missing or cannot be loaded.
pub const PLACEHOLDER_IMAGE: &str = "assets/placeholder_person.svg";

/// A country with a known flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagAsset {
    pub country: &'static str,
    pub path: &'static str,
    pub glyph: &'static str,
}

const FLAGS: [FlagAsset; 6] = [
    FlagAsset { country: "Vietnam", path: "assets/flags/vn_flag.svg", glyph: "🇻🇳" },
    FlagAsset { country: "Singapore", path: "assets/flags/sg_flag.svg", glyph: "🇸🇬" },
    FlagAsset { country: "Thailand", path: "assets/flags/th_flag.svg", glyph: "🇹🇭" },
    FlagAsset { country: "Malaysia", path: "assets/flags/my_flag.svg", glyph: "🇲🇾" },
    FlagAsset { country: "Indonesia", path: "assets/flags/id_flag.svg", glyph: "🇮🇩" },
    FlagAsset { country: "Philippines", path: "assets/flags/ph_flag.svg", glyph: "🇵🇭" },
];

/// Exact-name lookup in the flag table.
pub fn flag_for(country: &str) -> Option<&'static FlagAsset> {
    FLAGS.iter().find(|f| f.country == country)
}

/// What to draw in a card's avatar slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    Image(String),
    Placeholder(&'static str),
}

/// Resolves images against an optional local assets directory.
///
/// Without a directory, local files are looked up relative to the working
/// directory and flags are assumed present.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    root: Option<PathBuf>,
}

impl Assets {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// The flag for `country`, or `None` if unmapped or its file is missing.
    pub fn flag(&self, country: Option<&str>) -> Option<&'static FlagAsset> {
        let flag = flag_for(country?)?;
        match &self.root {
            Some(root) if !asset_exists(root, flag.path) => {
                tracing::debug!("flag asset missing: {}", flag.path);
                None
            }
            _ => Some(flag),
        }
    }

    /// The person image, falling back to the placeholder when it won't load.
    pub fn avatar(&self, image: Option<&str>) -> Avatar {
        match image {
            Some(reference) if self.image_loads(reference) => Avatar::Image(reference.to_string()),
            _ => Avatar::Placeholder(PLACEHOLDER_IMAGE),
        }
    }

    fn image_loads(&self, reference: &str) -> bool {
        match url::Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url.host().is_some(),
            _ => {
                let root = self.root.as_deref().unwrap_or_else(|| Path::new("."));
                asset_exists(root, reference)
            }
        }
    }
}

fn asset_exists(root: &Path, relative: &str) -> bool {
    let path = Path::new(relative);
    if path.is_absolute() {
        path.is_file()
    } else {
        root.join(path).is_file()
    }
}
