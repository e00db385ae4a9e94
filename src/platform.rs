//! Host platform capabilities.
//!
//! The screen never touches the filesystem directly. It is handed a
//! [`PermissionService`] and a [`MediaLibrary`] at construction time; both
//! answer on a channel from a background thread so the event loop is never
//! blocked. Tests substitute fakes for either service.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tracing::{debug, info, warn};
use url::Url;
use walkdir::WalkDir;

use crate::error::PlatformError;

/// First platform version that uses the scoped media permission.
pub const SCOPED_MEDIA_MIN_VERSION: u32 = 33;

/// MIME filter used when picking task images.
pub const IMAGE_MIME_FILTER: &str = "image/*";

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("svg", "image/svg+xml"),
];

/// Read access to media, in the flavour the platform version expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadMediaImages,
    ReadExternalStorage,
}

impl Permission {
    /// Select the media-read permission for a platform version.
    pub fn for_platform_version(version: u32) -> Self {
        if version >= SCOPED_MEDIA_MIN_VERSION {
            Permission::ReadMediaImages
        } else {
            Permission::ReadExternalStorage
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadMediaImages => "read-media-images",
            Permission::ReadExternalStorage => "read-external-storage",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grants or denies access to device media.
pub trait PermissionService {
    /// Ask for `permission`. The receiver yields the grant result exactly once.
    fn request(&self, permission: Permission) -> Receiver<bool>;
}

/// Enumerates pickable content on the device.
pub trait MediaLibrary {
    /// List items whose type matches `mime_filter` (e.g. `image/*`).
    fn scan(&self, mime_filter: &str) -> Receiver<Result<Vec<MediaItem>, PlatformError>>;
}

/// A piece of content the user can attach to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub uri: String,
    pub name: String,
    pub mime: &'static str,
}

/// Permission service backed by filesystem access to the media directory.
pub struct FsPermissionService {
    media_dir: PathBuf,
}

impl FsPermissionService {
    pub fn new(media_dir: &Path) -> Self {
        Self {
            media_dir: media_dir.to_path_buf(),
        }
    }
}

impl PermissionService for FsPermissionService {
    fn request(&self, permission: Permission) -> Receiver<bool> {
        let (tx, rx) = mpsc::channel();
        let dir = self.media_dir.clone();
        thread::spawn(move || {
            let granted = match fs::read_dir(&dir) {
                Ok(_) => true,
                Err(e) => {
                    warn!(%permission, dir = %dir.display(), error = %e, "media access refused");
                    false
                }
            };
            info!(%permission, granted, "permission request resolved");
            let _ = tx.send(granted);
        });
        rx
    }
}

/// Media library that walks a directory tree for matching files.
pub struct DirectoryLibrary {
    root: PathBuf,
    max_depth: usize,
}

impl DirectoryLibrary {
    pub fn new(root: &Path, max_depth: usize) -> Self {
        Self {
            root: root.to_path_buf(),
            max_depth,
        }
    }
}

impl MediaLibrary for DirectoryLibrary {
    fn scan(&self, mime_filter: &str) -> Receiver<Result<Vec<MediaItem>, PlatformError>> {
        let (tx, rx) = mpsc::channel();
        let root = self.root.clone();
        let max_depth = self.max_depth;
        let filter = mime_filter.to_string();
        thread::spawn(move || {
            let result = scan_directory(&root, max_depth, &filter);
            match &result {
                Ok(items) => debug!(count = items.len(), root = %root.display(), "media scan finished"),
                Err(e) => warn!(error = %e, "media scan failed"),
            }
            let _ = tx.send(result);
        });
        rx
    }
}

/// Collect files below `root` whose type matches `mime_filter`, sorted by path.
/// Hidden directories are skipped.
pub fn scan_directory(
    root: &Path,
    max_depth: usize,
    mime_filter: &str,
) -> Result<Vec<MediaItem>, PlatformError> {
    let root = fs::canonicalize(root).map_err(|source| PlatformError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            !e.file_name().to_string_lossy().starts_with('.')
        });

    let mut items = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(mime) = mime_for_path(entry.path()) else {
            continue;
        };
        if !mime_matches(mime_filter, mime) {
            continue;
        }
        let Ok(url) = Url::from_file_path(entry.path()) else {
            continue;
        };
        items.push(MediaItem {
            uri: url.to_string(),
            name: entry.file_name().to_string_lossy().into_owned(),
            mime,
        });
    }
    Ok(items)
}

/// Guess an image MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Match a MIME type against a filter such as `image/*`, `*/*` or `image/png`.
pub fn mime_matches(filter: &str, mime: &str) -> bool {
    if filter == "*/*" || filter == "*" {
        return true;
    }
    match filter.strip_suffix("/*") {
        Some(kind) => mime
            .split_once('/')
            .is_some_and(|(top, _)| top.eq_ignore_ascii_case(kind)),
        None => filter.eq_ignore_ascii_case(mime),
    }
}

/// Short human-readable label for an image reference.
///
/// The terminal cannot draw the image itself, so this stands in for the
/// rendering collaborator: it shows the file name a URI points at.
pub fn image_label(uri: &str) -> String {
    let Ok(url) = Url::parse(uri) else {
        return uri.to_string();
    };
    if url.scheme() == "file" {
        if let Some(name) = url.to_file_path().ok().as_deref().and_then(Path::file_name) {
            return name.to_string_lossy().into_owned();
        }
    }
    if let Some(last) = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
    {
        return last.to_string();
    }
    url.host_str().map(str::to_string).unwrap_or_else(|| uri.to_string())
}
