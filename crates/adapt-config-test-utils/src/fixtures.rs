use adapt_config::ModuleDescriptor;
use adapt_config::schema::DEFAULT_SCHEMA_FILE;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary application root with module directories underneath it.
#[derive(Debug)]
pub struct ModuleFixture {
    root: TempDir,
}

impl ModuleFixture {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    fn module_dir(&self, name: &str) -> PathBuf {
        self.root.path().join("node_modules").join(name)
    }

    /// Create a module whose schema is `schema`.
    pub fn module(&self, name: &str, schema: Value) -> ModuleDescriptor {
        let text = serde_json::to_string_pretty(&schema).expect("schema json");
        self.module_raw(name, &text)
    }

    /// Create a module whose schema file holds `contents` verbatim.
    pub fn module_raw(&self, name: &str, contents: &str) -> ModuleDescriptor {
        let dir = self.module_dir(name);
        write_file(&dir.join(DEFAULT_SCHEMA_FILE), contents);
        ModuleDescriptor::new(name, dir)
    }

    /// Create a module without a schema file.
    pub fn bare_module(&self, name: &str) -> ModuleDescriptor {
        let dir = self.module_dir(name);
        fs::create_dir_all(&dir).expect("module dir");
        ModuleDescriptor::new(name, dir)
    }

    /// Write the user config for `environment` and return its path.
    pub fn user_config(&self, environment: &str, contents: &str) -> PathBuf {
        let path = self
            .root
            .path()
            .join("conf")
            .join(format!("{environment}.config.json5"));
        write_file(&path, contents);
        path
    }
}

impl Default for ModuleFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}
