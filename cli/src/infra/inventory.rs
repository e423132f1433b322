//! `InventoryStore` backed by a flat `inventory.ini` file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::InventoryStore;
use crate::domain::Inventory;

pub struct FileInventoryStore {
    path: PathBuf,
}

impl FileInventoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InventoryStore for FileInventoryStore {
    fn load(&self) -> Result<Inventory> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Inventory::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Inventory::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&self.path, inventory.render())
            .with_context(|| format!("writing {}", self.path.display()))
    }
}
