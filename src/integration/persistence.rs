//! Hand-off of the finished inventory to storage.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::PersistenceError;
use crate::integration::encoding::encode_jpeg;
use crate::integration::inventory::Inventory;

/// File name of the item metadata written by [`DirectorySink`].
pub const METADATA_FILE: &str = "item_metadata.json";

/// Receives the final inventory once per run.
pub trait InventorySink {
    fn persist(&mut self, inventory: &Inventory) -> Result<(), PersistenceError>;
}

impl<T: InventorySink + ?Sized> InventorySink for &mut T {
    fn persist(&mut self, inventory: &Inventory) -> Result<(), PersistenceError> {
        (**self).persist(inventory)
    }
}

/// Writes `item_metadata.json` and one `<item_key>.jpg` per item into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self, item_key: &str) -> PathBuf {
        self.dir.join(format!("{item_key}.jpg"))
    }
}

impl InventorySink for DirectorySink {
    fn persist(&mut self, inventory: &Inventory) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;

        for (key, item) in &inventory.items {
            fs::write(self.snapshot_path(key), encode_jpeg(&item.snapshot)?)?;
        }

        let metadata = serde_json::to_vec_pretty(inventory)?;
        fs::write(self.dir.join(METADATA_FILE), metadata)?;

        info!(
            "Saved {} item snapshots and metadata to {}",
            inventory.item_count,
            self.dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::inventory::InventoryItem;
    use ndarray::Array3;

    fn inventory() -> Inventory {
        let mut inventory = Inventory::default();
        inventory.items.insert(
            "chair_1".to_string(),
            InventoryItem {
                class_label: "chair".to_string(),
                track_id: 3,
                peak_confidence: 0.9,
                first_seen_frame: 1,
                confirmed_frame: 3,
                snapshot_confidence: 0.9,
                snapshot_frame: 3,
                estimated_name: "Oak chair".to_string(),
                estimated_price: Some(120),
                snapshot: Array3::from_elem((20, 10, 3), 60),
            },
        );
        inventory.total_value = 120;
        inventory.item_count = 1;
        inventory
    }

    #[test]
    fn test_directory_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out"));
        sink.persist(&inventory()).unwrap();

        let jpeg = fs::read(sink.snapshot_path("chair_1")).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let metadata: serde_json::Value =
            serde_json::from_slice(&fs::read(sink.dir().join(METADATA_FILE)).unwrap()).unwrap();
        assert_eq!(metadata["total_value"], 120);
        assert_eq!(metadata["items"]["chair_1"]["estimated_name"], "Oak chair");
    }
}
