//! Directory-backed function hasher
//!
//! Fingerprints the compiled output of one function under the build
//! directory. The entry point is either a path (file or directory) relative
//! to the build directory, or a dotted class path: `com.shop.Orders` covers
//! `com/shop/Orders.*` and nested `com/shop/Orders$*.*`. Files the build
//! step listed in `compiled_files` are included as well.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::domain::entities::FunctionDescriptor;
use crate::domain::ports::{FunctionHasher, HashError};
use crate::domain::value_objects::ContentHash;

pub struct DirectoryFunctionHasher {
    build_dir: PathBuf,
}

impl DirectoryFunctionHasher {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    /// Files belonging to `function`, keyed by slash-separated relative path
    fn collect(&self, function: &FunctionDescriptor) -> Result<BTreeMap<String, PathBuf>, HashError> {
        let mut files = BTreeMap::new();

        let direct = self.build_dir.join(&function.entry_point);
        if direct.is_file() {
            self.insert(&mut files, direct);
        } else if direct.is_dir() {
            self.walk(&direct, &mut files)?;
        } else {
            self.collect_class(&function.entry_point, &mut files)?;
        }

        for extra in &function.compiled_files {
            let path = self.build_dir.join(extra);
            if path.is_dir() {
                self.walk(&path, &mut files)?;
            } else {
                if !path.is_file() {
                    return Err(HashError::Read {
                        source: std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "listed compiled file is missing",
                        ),
                        path,
                    });
                }
                self.insert(&mut files, path);
            }
        }

        if files.is_empty() {
            return Err(HashError::NotFound {
                entry_point: function.entry_point.clone(),
            });
        }
        Ok(files)
    }

    fn collect_class(
        &self,
        entry_point: &str,
        files: &mut BTreeMap<String, PathBuf>,
    ) -> Result<(), HashError> {
        let mut segments: Vec<&str> = entry_point.split('.').collect();
        let Some(class_name) = segments.pop() else {
            return Ok(());
        };
        let package_dir = segments
            .iter()
            .fold(self.build_dir.clone(), |dir, segment| dir.join(segment));
        if !package_dir.is_dir() {
            return Ok(());
        }

        let nested_prefix = format!("{}$", class_name);
        let entries = std::fs::read_dir(&package_dir).map_err(|source| HashError::Read {
            path: package_dir.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| HashError::Read {
                path: package_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let stem = name.split('.').next().unwrap_or_default();
            if stem == class_name || stem.starts_with(&nested_prefix) {
                self.insert(files, path);
            }
        }
        Ok(())
    }

    fn walk(&self, root: &Path, files: &mut BTreeMap<String, PathBuf>) -> Result<(), HashError> {
        for entry in WalkBuilder::new(root)
            .standard_filters(false)
            .hidden(false)
            .build()
        {
            let entry = entry.map_err(|err| HashError::Read {
                path: root.to_path_buf(),
                source: std::io::Error::other(err),
            })?;
            if entry.file_type().is_some_and(|t| t.is_file()) {
                self.insert(files, entry.into_path());
            }
        }
        Ok(())
    }

    fn insert(&self, files: &mut BTreeMap<String, PathBuf>, path: PathBuf) {
        let relative = path
            .strip_prefix(&self.build_dir)
            .unwrap_or(&path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(relative, path);
    }
}

impl FunctionHasher for DirectoryFunctionHasher {
    fn hash(&self, function: &FunctionDescriptor) -> Result<ContentHash, HashError> {
        let files = self.collect(function)?;

        let mut hasher = Sha256::new();
        for (relative, path) in &files {
            let contents = std::fs::read(path).map_err(|source| HashError::Read {
                path: path.clone(),
                source,
            })?;
            hasher.update(relative.as_bytes());
            hasher.update([0u8]);
            hasher.update((contents.len() as u64).to_le_bytes());
            hasher.update(&contents);
        }
        trace!(
            entry_point = %function.entry_point,
            files = files.len(),
            "hashed compiled output"
        );
        Ok(ContentHash::from_hasher(hasher))
    }
}
