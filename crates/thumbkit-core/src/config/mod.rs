//! User-facing configuration (TOML settings and icon colours).

pub mod settings;
pub mod theme;
