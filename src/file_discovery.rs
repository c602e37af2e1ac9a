use crate::error::{Result, RulesError};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;

/// Async discovery of MISMO documents under files and directories
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// Lowercase extensions to include, without the dot
    extensions: Vec<String>,
    /// Maximum depth for directory traversal (None = unlimited)
    max_depth: Option<usize>,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            max_depth: None,
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Discover files under every path, sorted and without duplicates.
    ///
    /// A path naming a file is taken as-is; directories are walked and
    /// filtered by extension.
    pub async fn discover_all(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in paths {
            files.extend(self.discover_files(path).await?);
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Discover files in a single path (file or directory)
    pub async fn discover_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| RulesError::FileDiscovery {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if metadata.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        self.walk(path.to_path_buf(), 0, &mut files).await?;
        Ok(files)
    }

    fn walk<'a>(
        &'a self,
        dir: PathBuf,
        depth: usize,
        files: &'a mut Vec<PathBuf>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut read_dir = fs::read_dir(&dir).await.map_err(|e| RulesError::FileDiscovery {
                path: dir.clone(),
                reason: e.to_string(),
            })?;

            while let Some(entry) = read_dir.next_entry().await? {
                let entry_path = entry.path();
                let file_type = entry.file_type().await?;

                // symlinks are never followed
                if file_type.is_symlink() {
                    continue;
                }

                let metadata = match fs::metadata(&entry_path).await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        tracing::warn!(path = %entry_path.display(), error = %e, "skipping unreadable entry");
                        continue;
                    }
                };

                if metadata.is_file() {
                    if self.should_process(&entry_path) {
                        files.push(entry_path);
                    }
                } else if metadata.is_dir() {
                    if self.max_depth.is_some_and(|max| depth >= max) {
                        continue;
                    }
                    if let Err(e) = self.walk(entry_path.clone(), depth + 1, files).await {
                        tracing::warn!(path = %entry_path.display(), error = %e, "skipping directory");
                    }
                }
            }

            Ok(())
        })
    }

    /// Whether a file's extension is one of the configured extensions
    pub fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std_fs::create_dir_all(parent).unwrap();
        }
        std_fs::write(path, "<LOAN/>").unwrap();
    }

    #[test]
    fn test_should_process_is_case_insensitive() {
        let discovery = FileDiscovery::new().with_extensions(vec![".XML".into(), "mismo".into()]);
        assert!(discovery.should_process(Path::new("loan.xml")));
        assert!(discovery.should_process(Path::new("loan.XML")));
        assert!(discovery.should_process(Path::new("loan.mismo")));
        assert!(!discovery.should_process(Path::new("loan.json")));
        assert!(!discovery.should_process(Path::new("README")));
    }

    #[tokio::test]
    async fn test_max_depth_limits_recursion() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("top.xml"));
        touch(&temp.path().join("a/one.xml"));
        touch(&temp.path().join("a/b/two.xml"));
        touch(&temp.path().join("a/notes.txt"));

        let all = FileDiscovery::new().discover_files(temp.path()).await.unwrap();
        assert_eq!(all.len(), 3);

        let shallow = FileDiscovery::new()
            .with_max_depth(Some(0))
            .discover_files(temp.path())
            .await
            .unwrap();
        assert_eq!(shallow, vec![temp.path().join("top.xml")]);

        let one_level = FileDiscovery::new()
            .with_max_depth(Some(1))
            .discover_files(temp.path())
            .await
            .unwrap();
        assert_eq!(one_level.len(), 2);
    }

    #[tokio::test]
    async fn test_explicit_file_is_kept_and_results_deduplicated() {
        let temp = TempDir::new().unwrap();
        let xml = temp.path().join("loan.xml");
        let named = temp.path().join("loan.txt");
        touch(&xml);
        touch(&named);

        let files = FileDiscovery::new()
            .discover_all(&[temp.path().to_path_buf(), xml.clone(), named.clone()])
            .await
            .unwrap();
        assert_eq!(files, vec![xml, named]);
    }

    #[tokio::test]
    async fn test_missing_path_is_a_discovery_error() {
        let temp = TempDir::new().unwrap();
        let err = FileDiscovery::new()
            .discover_files(&temp.path().join("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, RulesError::FileDiscovery { .. }));
    }
}
