//! Input discovery and output path construction.
//!
//! Conventional I/O glue around the cache core: which files count as
//! images, how a directory is turned into a work list, and where a
//! converted text file lands.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::TextraError;

/// Recognized image file extensions, matched case-insensitively on the
/// extension only.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff"];

/// Whether `path` has a recognized image extension.
#[must_use]
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Collect image files under `input`: the file itself if it is one, or all
/// recognized images under the directory (recursive).
///
/// Unreadable subdirectories are logged and skipped; they never abort the
/// collection.
///
/// # Errors
///
/// Returns [`TextraError::InvalidInput`] if `input` is neither an existing
/// file nor a directory.
pub fn collect_image_files(input: &Path) -> Result<Vec<PathBuf>, TextraError> {
    if input.is_file() {
        return Ok(if is_image_file(input) {
            vec![input.to_path_buf()]
        } else {
            log::warn!("{} is not a recognized image file", input.display());
            Vec::new()
        });
    }

    if !input.is_dir() {
        return Err(TextraError::InvalidInput {
            path: input.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if is_image_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("skipping unreadable path: {e}"),
        }
    }
    // Deterministic queue order regardless of filesystem iteration order.
    files.sort();
    Ok(files)
}

/// Build the output path for `input`: `<output_dir>/<stem>.txt`, or next to
/// the input file when no output directory is given.
#[must_use]
pub fn qualified_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut name = PathBuf::from(stem);
    name.set_extension("txt");

    match output_dir {
        Some(dir) => dir.join(name),
        None => match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
            _ => name,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert!(is_image_file(Path::new("scan.png")));
        assert!(is_image_file(Path::new("SCAN.PNG")));
        assert!(is_image_file(Path::new("photo.JpEg")));
        assert!(is_image_file(Path::new("fax.tif")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("archive.png.zip")));
        assert!(!is_image_file(Path::new("noextension")));
    }

    #[test]
    fn collects_only_images_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        File::create(dir.path().join("a.png")).unwrap();
        File::create(dir.path().join("skip.txt")).unwrap();
        File::create(nested.join("b.JPG")).unwrap();

        let files = collect_image_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_image_file(f)));
    }

    #[test]
    fn single_image_file_input_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("one.gif");
        File::create(&img).unwrap();

        assert_eq!(collect_image_files(&img).unwrap(), vec![img]);
    }

    #[test]
    fn missing_input_is_invalid() {
        let err = collect_image_files(Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, TextraError::InvalidInput { .. }));
    }

    #[test]
    fn output_path_lands_in_the_requested_directory() {
        let out = qualified_output_path(Path::new("/imgs/scan.png"), Some(Path::new("/out")));
        assert_eq!(out, PathBuf::from("/out/scan.txt"));
    }

    #[test]
    fn output_path_defaults_alongside_the_input() {
        let out = qualified_output_path(Path::new("/imgs/scan.png"), None);
        assert_eq!(out, PathBuf::from("/imgs/scan.txt"));
    }
}
