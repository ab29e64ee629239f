use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Installdoc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width:height every embedded photo is padded to.
pub const TARGET_ASPECT_RATIO: f64 = 4.0 / 3.0;

/// Ratios closer than this to the target are left untouched.
pub const ASPECT_EPSILON: f64 = 1e-3;

/// Longest edge, in pixels, of a photo embedded in the document.
pub const MAX_EMBED_PX: u32 = 1400;

/// JPEG quality used when re-encoding photos for embedding.
pub const JPEG_QUALITY: u8 = 85;

/// Number of photo slots on the page (4 columns x 2 rows).
pub const PHOTO_SLOT_COUNT: usize = 8;

/// Filename used when the site address sanitizes to nothing.
pub const FALLBACK_FILENAME: &str = "output";

/// Logical font names resolved by a `FontProvider`.
pub const FONT_REGULAR: &str = "regular";
pub const FONT_BOLD: &str = "bold";

/// Font files looked up in a fonts directory, by logical name.
pub fn font_file_name(logical_name: &str) -> Option<&'static str> {
    match logical_name {
        FONT_REGULAR => Some("NanumGothic.ttf"),
        FONT_BOLD => Some("NanumGothicBold.ttf"),
        _ => None,
    }
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "installdoc=info,installdoc_lib=info"
}

/// Fonts directory next to the working directory (`./fonts`).
pub fn local_fonts_dir() -> PathBuf {
    PathBuf::from("fonts")
}

/// Per-user fonts directory: ~/Installdoc/fonts/
pub fn user_fonts_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME).join("fonts"))
}

/// Candidate font directories, searched in order.
pub fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![local_fonts_dir()];
    if let Some(user) = user_fonts_dir() {
        dirs.push(user);
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_installdoc() {
        assert_eq!(APP_NAME, "Installdoc");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }

    #[test]
    fn font_files_known_for_logical_names() {
        assert_eq!(font_file_name(FONT_REGULAR), Some("NanumGothic.ttf"));
        assert_eq!(font_file_name(FONT_BOLD), Some("NanumGothicBold.ttf"));
        assert_eq!(font_file_name("italic"), None);
    }

    #[test]
    fn local_fonts_dir_searched_first() {
        let dirs = default_font_dirs();
        assert_eq!(dirs[0], PathBuf::from("fonts"));
    }

    #[test]
    fn user_fonts_dir_under_home() {
        if let (Some(dir), Some(home)) = (user_fonts_dir(), dirs::home_dir()) {
            assert!(dir.starts_with(home));
            assert!(dir.ends_with("fonts"));
        }
    }
}
