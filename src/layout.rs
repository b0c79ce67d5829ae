//! Property file path resolution
//!
//! Every property-bearing entity supplies its own file path. The store only
//! normalizes that path to an absolute one; it never validates its shape.

use std::path::{Component, Path, PathBuf};

/// Something that knows where its property file lives
///
/// Implemented for plain paths, and for anything that resolves an entity
/// identifier against a base directory (see [`DirectoryLayout`]).
pub trait PropertyLocation {
    /// Path to the property file. The file does not have to exist.
    fn property_file_path(&self) -> PathBuf;
}

impl PropertyLocation for PathBuf {
    fn property_file_path(&self) -> PathBuf {
        self.clone()
    }
}

impl PropertyLocation for &Path {
    fn property_file_path(&self) -> PathBuf {
        self.to_path_buf()
    }
}

impl PropertyLocation for &str {
    fn property_file_path(&self) -> PathBuf {
        PathBuf::from(self)
    }
}

/// Maps entity identifiers to `<base_dir>/<id>.<extension>`
///
/// # Example
///
/// ```rust
/// use propstore::DirectoryLayout;
///
/// let layout = DirectoryLayout::new("/shows/demo/properties");
/// let entity = layout.entity("shot_010");
/// # use propstore::PropertyLocation;
/// assert!(entity.property_file_path().ends_with("shot_010.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLayout {
    base_dir: PathBuf,
    extension: String,
}

impl DirectoryLayout {
    /// Create a layout rooted at `base_dir`
    ///
    /// Supports `~` expansion for home directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let path: PathBuf = base_dir.into();
        let expanded = if path.starts_with("~") {
            match dirs::home_dir() {
                Some(home) => home.join(path.strip_prefix("~").unwrap_or(&path)),
                None => path,
            }
        } else {
            path
        };
        Self {
            base_dir: expanded,
            extension: "json".into(),
        }
    }

    /// Set the file extension (default: "json")
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Base directory of this layout
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Property file path for the given identifier
    pub fn file_path(&self, id: &str) -> PathBuf {
        if self.extension.is_empty() {
            self.base_dir.join(id)
        } else {
            self.base_dir.join(format!("{}.{}", id, self.extension))
        }
    }

    /// Bind an identifier to this layout
    pub fn entity(&self, id: impl Into<String>) -> LayoutEntity {
        LayoutEntity {
            layout: self.clone(),
            id: id.into(),
        }
    }
}

/// An entity identifier resolved through a [`DirectoryLayout`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntity {
    layout: DirectoryLayout,
    id: String,
}

impl LayoutEntity {
    /// The entity identifier
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl PropertyLocation for LayoutEntity {
    fn property_file_path(&self) -> PathBuf {
        self.layout.file_path(&self.id)
    }
}

/// Make a path absolute and collapse `.` and `..` lexically
///
/// Symlinks are not resolved and the path does not have to exist.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
