use super::{LocalStore, ASSETS_KEY};
use crate::types::{AssetKind, GeneratedAsset};
use crate::Result;

/// Newest-first archive of generated assets.
pub struct AssetArchive {
    store: LocalStore,
    assets: Vec<GeneratedAsset>,
}

impl AssetArchive {
    pub fn load(store: LocalStore) -> Result<Self> {
        let assets = store.get_json(ASSETS_KEY)?.unwrap_or_default();
        Ok(Self { store, assets })
    }

    pub fn all(&self) -> &[GeneratedAsset] {
        &self.assets
    }

    pub fn of_kind(&self, kind: AssetKind) -> impl Iterator<Item = &GeneratedAsset> {
        self.assets.iter().filter(move |a| a.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn archive(&mut self, asset: GeneratedAsset) -> Result<()> {
        self.assets.insert(0, asset);
        self.store.set_json(ASSETS_KEY, &self.assets)
    }

    /// Drop every record. Files referenced by the records are left alone.
    pub fn clear(&mut self) -> Result<()> {
        self.assets.clear();
        self.store.remove(ASSETS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::temp_store;
    use crate::types::{ImageConfig, QualityTier, VideoConfig};

    #[test]
    fn newest_first_and_filtered() {
        let (_dir, store) = temp_store();
        let mut archive = AssetArchive::load(store.clone()).unwrap();
        archive
            .archive(GeneratedAsset::image("a.png", "cat", ImageConfig::new(QualityTier::Standard)))
            .unwrap();
        archive
            .archive(GeneratedAsset::video("b.mp4", "dog", VideoConfig::default()))
            .unwrap();

        assert_eq!(archive.all()[0].prompt, "dog");
        assert_eq!(archive.of_kind(AssetKind::Image).count(), 1);

        let reloaded = AssetArchive::load(store.clone()).unwrap();
        assert_eq!(reloaded.len(), 2);

        let mut reloaded = reloaded;
        reloaded.clear().unwrap();
        assert!(AssetArchive::load(store).unwrap().is_empty());
    }
}
