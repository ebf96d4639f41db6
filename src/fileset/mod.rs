//! Named file set bundles.
//!
//! A file set named `N` is the directory `<package_dir>/N/`, laid out as a
//! mirror of the target filesystem:
//!
//! ```text
//! packages/example_com/
//!   etc/nginx/sites-available/example_com.tmpl  ->  /etc/nginx/sites-available/example_com
//!   home/example_com/www/index.html             ->  /home/example_com/www/index.html
//! ```
//!
//! Files ending in `.tmpl` are rendered with [`resolve_string`] against the
//! push parameters and installed without the suffix. Everything else is
//! copied byte for byte.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::{resolve_string, TemplateContext};
use crate::error::{CookError, Result};

/// Suffix marking a file as a template.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

const DEFAULT_MODE: u32 = 0o644;

/// One file inside a file set directory.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSetEntry {
    /// Path on the local machine.
    pub source: PathBuf,
    /// Absolute path on the target.
    pub target: String,
    /// Whether the file is rendered before upload.
    pub template: bool,
    /// Permission bits to install with.
    pub mode: u32,
}

/// A file set discovered on disk.
#[derive(Debug, Clone)]
pub struct FileSet {
    pub name: String,
    pub root: PathBuf,
    pub entries: Vec<FileSetEntry>,
}

impl FileSet {
    /// Discover the file set `name` under `package_dir`.
    ///
    /// # Errors
    ///
    /// Returns `FileSetNotFound` if `<package_dir>/<name>` is not a directory.
    pub fn load(package_dir: &Path, name: &str) -> Result<Self> {
        let root = package_dir.join(name);
        if !root.is_dir() {
            return Err(CookError::FileSetNotFound {
                name: name.to_string(),
                path: root,
            });
        }

        let mut entries = Vec::new();
        collect_entries(&root, &root, &mut entries)?;
        entries.sort_by(|a, b| a.target.cmp(&b.target));

        tracing::debug!("File set '{}' has {} files", name, entries.len());

        Ok(Self {
            name: name.to_string(),
            root,
            entries,
        })
    }

    /// Render every entry with the given parameters.
    pub fn render(&self, context: &TemplateContext) -> Result<RenderedFileSet> {
        let files = self
            .entries
            .iter()
            .map(|entry| render_entry(entry, &self.root, context))
            .collect::<Result<Vec<_>>>()?;

        Ok(RenderedFileSet {
            name: self.name.clone(),
            files,
        })
    }
}

/// A file ready to be written to the target.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub target: String,
    pub contents: Vec<u8>,
    pub mode: u32,
}

impl RenderedFile {
    pub fn new(target: impl Into<String>, contents: impl Into<Vec<u8>>, mode: u32) -> Self {
        Self {
            target: target.into(),
            contents: contents.into(),
            mode,
        }
    }

    /// Lowercase hex SHA-256 of the contents, as printed by `sha256sum`.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.contents);
        hex::encode(hasher.finalize())
    }

    /// Permission bits as an octal string for `chmod`.
    pub fn mode_string(&self) -> String {
        format!("{:o}", self.mode)
    }

    /// Parent directory on the target.
    pub fn parent_dir(&self) -> Option<&str> {
        Path::new(&self.target)
            .parent()
            .and_then(Path::to_str)
            .filter(|p| !p.is_empty())
    }
}

/// A fully rendered file set.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFileSet {
    pub name: String,
    pub files: Vec<RenderedFile>,
}

impl RenderedFileSet {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

fn collect_entries(root: &Path, dir: &Path, entries: &mut Vec<FileSetEntry>) -> Result<()> {
    for item in fs::read_dir(dir)? {
        let item = item?;
        let path = item.path();
        let file_type = item.file_type()?;

        if file_type.is_dir() {
            collect_entries(root, &path, entries)?;
        } else if file_type.is_file() {
            entries.push(describe_entry(root, &path)?);
        } else {
            tracing::warn!("Skipping non-regular file in file set: {}", path.display());
        }
    }
    Ok(())
}

fn describe_entry(root: &Path, path: &Path) -> Result<FileSetEntry> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| CookError::Other(anyhow::anyhow!("{}: {}", path.display(), e)))?;

    let relative = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    let (target, template) = match relative.strip_suffix(TEMPLATE_SUFFIX) {
        Some(stripped) => (format!("/{}", stripped), true),
        None => (format!("/{}", relative), false),
    };

    Ok(FileSetEntry {
        source: path.to_path_buf(),
        target,
        template,
        mode: file_mode(path)?,
    })
}

#[cfg(unix)]
fn file_mode(path: &Path) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::metadata(path)?.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> Result<u32> {
    Ok(DEFAULT_MODE)
}

fn render_entry(entry: &FileSetEntry, root: &Path, context: &TemplateContext) -> Result<RenderedFile> {
    let display = entry
        .source
        .strip_prefix(root)
        .unwrap_or(&entry.source)
        .display()
        .to_string();

    let contents = if entry.template {
        let text = fs::read_to_string(&entry.source).map_err(|e| CookError::TemplateError {
            file: display.clone(),
            message: e.to_string(),
        })?;
        resolve_string(&text, context, &display)?.into_bytes()
    } else {
        fs::read(&entry.source)?
    };

    let mode = if entry.mode == 0 { DEFAULT_MODE } else { entry.mode };

    Ok(RenderedFile::new(entry.target.clone(), contents, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn package(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (path, contents) in files {
            let full = temp.path().join("site").join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, contents).unwrap();
        }
        temp
    }

    #[test]
    fn missing_set_is_file_set_not_found() {
        let temp = TempDir::new().unwrap();
        let err = FileSet::load(temp.path(), "nope").unwrap_err();
        assert!(matches!(err, CookError::FileSetNotFound { name, .. } if name == "nope"));
    }

    #[test]
    fn discovers_nested_files_with_absolute_targets() {
        let temp = package(&[
            ("etc/nginx/sites-available/site.tmpl", "server {}"),
            ("home/site/www/index.html", "<h1>hi</h1>"),
        ]);
        let set = FileSet::load(temp.path(), "site").unwrap();

        let targets: Vec<_> = set.entries.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(
            targets,
            vec!["/etc/nginx/sites-available/site", "/home/site/www/index.html"]
        );
        assert!(set.entries[0].template);
        assert!(!set.entries[1].template);
    }

    #[test]
    fn renders_templates_and_copies_plain_files() {
        let temp = package(&[
            ("etc/site.conf.tmpl", "server_name ${computer.host}; # $host"),
            ("etc/static.conf", "literal ${not_rendered}"),
        ]);
        let set = FileSet::load(temp.path(), "site").unwrap();
        let ctx = TemplateContext::new(json!({"name": "web1", "computer": {"host": "web1.example.com"}}));
        let rendered = set.render(&ctx).unwrap();

        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered.files[0].target, "/etc/site.conf");
        assert_eq!(
            rendered.files[0].contents,
            b"server_name web1.example.com; # $host".to_vec()
        );
        assert_eq!(rendered.files[1].contents, b"literal ${not_rendered}".to_vec());
    }

    #[test]
    fn undefined_variable_fails_render() {
        let temp = package(&[("etc/site.conf.tmpl", "${computer.missing}")]);
        let set = FileSet::load(temp.path(), "site").unwrap();
        let err = set.render(&TemplateContext::new(json!({}))).unwrap_err();
        assert!(matches!(err, CookError::TemplateError { file, .. } if file.contains("site.conf.tmpl")));
    }

    #[cfg(unix)]
    #[test]
    fn keeps_source_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let temp = package(&[("usr/local/bin/hook", "#!/bin/sh\n")]);
        let script = temp.path().join("site/usr/local/bin/hook");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let set = FileSet::load(temp.path(), "site").unwrap();
        let rendered = set.render(&TemplateContext::default()).unwrap();
        assert_eq!(rendered.files[0].mode_string(), "755");
    }

    #[test]
    fn digest_matches_known_sha256() {
        let file = RenderedFile::new("/x", "hello\n", 0o644);
        assert_eq!(
            file.digest(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn parent_dir_of_target() {
        let file = RenderedFile::new("/etc/nginx/site", "", 0o644);
        assert_eq!(file.parent_dir(), Some("/etc/nginx"));
        assert_eq!(RenderedFile::new("/", "", 0o644).parent_dir(), None);
    }
}
