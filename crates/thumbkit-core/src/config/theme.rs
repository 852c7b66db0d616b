//! Icon tint colours.
//!
//! Colours are stored as strings (e.g. `"teal"`, `"#ff5500"`) and converted
//! to a [`Tint`] when the static icon set is built, via [`parse_color`].

use serde::{Deserialize, Serialize};

use crate::thumb::asset::Tint;
use crate::thumb::icons::IconId;

/// Background tint per static icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconColors {
    #[serde(default = "default_apps")]
    pub apps: String,
    #[serde(default = "default_archives")]
    pub archives: String,
    #[serde(default = "default_audio")]
    pub audio: String,
    #[serde(default = "default_docs")]
    pub docs: String,
    #[serde(default = "default_images")]
    pub images: String,
    #[serde(default = "default_misc")]
    pub misc: String,
    #[serde(default = "default_video")]
    pub video: String,
    /// Colour of directory icons before the folder opacity is applied.
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default = "default_selected")]
    pub selected: String,
}

impl Default for IconColors {
    fn default() -> Self {
        Self {
            apps: default_apps(),
            archives: default_archives(),
            audio: default_audio(),
            docs: default_docs(),
            images: default_images(),
            misc: default_misc(),
            video: default_video(),
            folder: default_folder(),
            selected: default_selected(),
        }
    }
}

impl IconColors {
    /// Returns the tint for a default icon, or the misc tint for anything
    /// that is not one of the built-in icons.
    ///
    /// Unparseable colour strings fall back to the built-in default for
    /// that slot.
    pub fn tint_for(&self, id: IconId) -> Tint {
        let (configured, fallback) = match id {
            IconId::APPS => (&self.apps, default_apps()),
            IconId::ARCHIVES => (&self.archives, default_archives()),
            IconId::AUDIO => (&self.audio, default_audio()),
            IconId::DOCS => (&self.docs, default_docs()),
            IconId::IMAGES => (&self.images, default_images()),
            IconId::VIDEO => (&self.video, default_video()),
            IconId::FOLDER => (&self.folder, default_folder()),
            IconId::CHECK => (&self.selected, default_selected()),
            _ => (&self.misc, default_misc()),
        };
        parse_color(configured)
            .or_else(|| parse_color(&fallback))
            .unwrap_or(Tint::WHITE)
    }
}

/// Parses a colour name or `#rrggbb` / `#rrggbbaa` hex string.
pub fn parse_color(s: &str) -> Option<Tint> {
    let s = s.trim().to_lowercase();
    let tint = match s.as_str() {
        "black" => Tint::rgb(0x00, 0x00, 0x00),
        "white" => Tint::WHITE,
        "red" => Tint::rgb(0xf4, 0x43, 0x36),
        "green" => Tint::rgb(0x4c, 0xaf, 0x50),
        "blue" => Tint::rgb(0x21, 0x96, 0xf3),
        "yellow" => Tint::rgb(0xff, 0xeb, 0x3b),
        "orange" => Tint::rgb(0xff, 0x98, 0x00),
        "pink" => Tint::rgb(0xe9, 0x1e, 0x63),
        "teal" => Tint::rgb(0x00, 0x96, 0x88),
        "brown" => Tint::rgb(0x79, 0x55, 0x48),
        "gray" | "grey" => Tint::rgb(0x9e, 0x9e, 0x9e),
        hex if hex.starts_with('#') && (hex.len() == 7 || hex.len() == 9) => {
            let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            let a = if hex.len() == 9 { byte(7)? } else { 0xff };
            Tint {
                r: byte(1)?,
                g: byte(3)?,
                b: byte(5)?,
                a,
            }
        }
        _ => return None,
    };
    Some(tint)
}

fn default_apps() -> String {
    "#8bc34a".to_string()
}

fn default_archives() -> String {
    "#795548".to_string()
}

fn default_audio() -> String {
    "#ff9800".to_string()
}

fn default_docs() -> String {
    "#2196f3".to_string()
}

fn default_images() -> String {
    "#e91e63".to_string()
}

fn default_misc() -> String {
    "#9e9e9e".to_string()
}

fn default_video() -> String {
    "#f44336".to_string()
}

fn default_folder() -> String {
    "#009688".to_string()
}

fn default_selected() -> String {
    "#607d8b".to_string()
}
