pub mod disk;
pub mod memory;

use crate::core::table::{Row, Table};
use anyhow::{Context, Result};
use crate::core::config::StoreKind;
use disk::DiskTable;
use memory::MemoryTable;
use fjall::{Keyspace, PartitionCreateOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The on-disk database holding one partition per feed.
pub struct Database {
    keyspace: Keyspace,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        debug!("Opened database at {}", path.display());
        Ok(Self { keyspace })
    }

    pub fn table<R: Row>(&self, name: &str) -> Result<Arc<dyn Table<R>>> {
        let partition = self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open table: {name}"))?;
        Ok(Arc::new(DiskTable::new(
            name,
            self.keyspace.clone(),
            partition,
        )))
    }
}

/// The backend selected by configuration.
pub enum Storage {
    Disk(Database),
    Memory,
}

impl Storage {
    pub fn open(kind: StoreKind, path: &Path) -> Result<Self> {
        match kind {
            StoreKind::Disk => Ok(Storage::Disk(Database::open(path)?)),
            StoreKind::Memory => {
                debug!("Using in-memory store");
                Ok(Storage::Memory)
            }
        }
    }

    pub fn table<R: Row>(&self, name: &str) -> Result<Arc<dyn Table<R>>> {
        match self {
            Storage::Disk(database) => database.table(name),
            Storage::Memory => Ok(Arc::new(MemoryTable::<R>::new(name))),
        }
    }
}
