use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, warn};

use crate::db::Database;
use crate::models::{BrandingUpdate, CompanySettings, CompanySettingsUpdate};
use crate::services::image::{ImageEncoder, ImageError};

pub const SETTINGS_KEY: &str = "company_settings";

const MAX_LOGO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings storage: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("settings serialization: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("only image files can be used as a logo")]
    NotAnImage,
    #[error("logo images are limited to 5 MiB")]
    LogoTooLarge,
    #[error("a logo upload is already in progress")]
    UploadInProgress,
    #[error(transparent)]
    Encode(#[from] ImageError),
    #[error("settings state lock poisoned")]
    Lock,
}

/// Single source of truth for the company settings record.
///
/// Loaded once at construction, kept fully populated for the life of the
/// process, and rewritten to its storage slot in full on every change.
pub struct SettingsStore {
    db: Arc<Mutex<Database>>,
    settings: Mutex<CompanySettings>,
    encoder: Box<dyn ImageEncoder>,
    logo_upload: AtomicBool,
}

impl SettingsStore {
    /// Read the persisted record and merge it over the defaults, so fields
    /// introduced after the record was written still show up. An absent or
    /// unreadable record falls back to the defaults; unreadable is logged,
    /// never fatal.
    pub fn load(
        db: Arc<Mutex<Database>>,
        encoder: Box<dyn ImageEncoder>,
    ) -> Result<Self, SettingsError> {
        let stored = {
            let db = db.lock().map_err(|_| SettingsError::Lock)?;
            db.get_value(SETTINGS_KEY)?
        };

        let mut settings = CompanySettings::default();
        if let Some(raw) = stored {
            match serde_json::from_str::<CompanySettingsUpdate>(&raw) {
                Ok(partial) => settings.apply(partial),
                Err(err) => warn!("stored company settings unreadable, using defaults: {err}"),
            }
        }

        Ok(SettingsStore {
            db,
            settings: Mutex::new(settings),
            encoder,
            logo_upload: AtomicBool::new(false),
        })
    }

    pub fn snapshot(&self) -> Result<CompanySettings, SettingsError> {
        Ok(self.settings.lock().map_err(|_| SettingsError::Lock)?.clone())
    }

    /// Merge a partial update into the record, then rewrite the whole
    /// record to storage. Sections not named in `update` are untouched;
    /// within a named section, absent fields keep their current values.
    pub fn update(&self, update: CompanySettingsUpdate) -> Result<(), SettingsError> {
        let serialized = {
            let mut settings = self.settings.lock().map_err(|_| SettingsError::Lock)?;
            settings.apply(update);
            serde_json::to_string(&*settings)?
        };
        let db = self.db.lock().map_err(|_| SettingsError::Lock)?;
        db.set_value(SETTINGS_KEY, &serialized)?;
        Ok(())
    }

    /// Restore the built-in defaults and delete the storage slot, so a
    /// cold load also starts from the defaults. Confirmation is the
    /// caller's business; this runs unconditionally.
    pub fn reset(&self) -> Result<(), SettingsError> {
        {
            let mut settings = self.settings.lock().map_err(|_| SettingsError::Lock)?;
            *settings = CompanySettings::default();
        }
        let db = self.db.lock().map_err(|_| SettingsError::Lock)?;
        db.remove_value(SETTINGS_KEY)?;
        info!("company settings reset to defaults");
        Ok(())
    }

    /// Validate an uploaded image, embed it via the injected encoder and
    /// store the result as `branding.logo`, returning the embedded string.
    ///
    /// At most one upload runs per store; rejected or failed uploads leave
    /// the record unchanged and release the guard so the caller can retry.
    pub async fn import_logo(&self, bytes: Vec<u8>, mime: &str) -> Result<String, SettingsError> {
        if !mime.starts_with("image/") {
            return Err(SettingsError::NotAnImage);
        }
        if bytes.len() > MAX_LOGO_BYTES {
            return Err(SettingsError::LogoTooLarge);
        }
        if self
            .logo_upload
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SettingsError::UploadInProgress);
        }

        let encoded = match self.encoder.encode(bytes, mime).await {
            Ok(encoded) => encoded,
            Err(err) => {
                self.logo_upload.store(false, Ordering::SeqCst);
                return Err(err.into());
            }
        };

        let result = self.update(CompanySettingsUpdate {
            branding: Some(BrandingUpdate {
                logo: Some(encoded.clone()),
                ..Default::default()
            }),
            ..Default::default()
        });
        self.logo_upload.store(false, Ordering::SeqCst);
        result.map(|_| encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FiscalInfoUpdate;
    use crate::services::image::DataUriEncoder;
    use async_trait::async_trait;
    use tokio::sync::oneshot;

    fn open_db() -> Arc<Mutex<Database>> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Arc::new(Mutex::new(Database::open_in_memory().unwrap()))
    }

    fn store(db: Arc<Mutex<Database>>) -> SettingsStore {
        SettingsStore::load(db, Box::new(DataUriEncoder)).unwrap()
    }

    #[test]
    fn empty_storage_loads_defaults() -> anyhow::Result<()> {
        let store = store(open_db());
        assert_eq!(store.snapshot()?, CompanySettings::default());
        Ok(())
    }

    #[test]
    fn updates_survive_a_fresh_load() -> anyhow::Result<()> {
        let db = open_db();
        let store_a = store(db.clone());
        store_a.update(CompanySettingsUpdate {
            fiscal_info: Some(FiscalInfoUpdate {
                cnae: Some("4744-0/99".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })?;

        let store_b = store(db);
        let reloaded = store_b.snapshot()?;
        assert_eq!(reloaded.fiscal_info.cnae, "4744-0/99");
        assert_eq!(reloaded.basic_info, CompanySettings::default().basic_info);
        Ok(())
    }

    #[test]
    fn saved_record_round_trips_exactly() -> anyhow::Result<()> {
        let db = open_db();
        let store_a = store(db.clone());
        store_a.update(CompanySettingsUpdate {
            branding: Some(BrandingUpdate {
                logo: Some("https://example.com/logo.png".to_string()),
                primary_color: Some("#112233".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })?;
        let saved = store_a.snapshot()?;

        assert_eq!(store(db).snapshot()?, saved);
        Ok(())
    }

    #[test]
    fn old_records_gain_newly_defaulted_fields() -> anyhow::Result<()> {
        let db = open_db();
        {
            let db = db.lock().unwrap();
            // A record written before most fields existed.
            db.set_value(SETTINGS_KEY, r#"{"basicInfo":{"name":"OUTRA EMPRESA"}}"#)?;
        }

        let settings = store(db).snapshot()?;
        assert_eq!(settings.basic_info.name, "OUTRA EMPRESA");
        assert_eq!(settings.basic_info.trade_name, "Carnevalli Esquadrias");
        assert_eq!(settings.branding, CompanySettings::default().branding);
        Ok(())
    }

    #[test]
    fn unreadable_record_falls_back_to_defaults() -> anyhow::Result<()> {
        let db = open_db();
        {
            let db = db.lock().unwrap();
            db.set_value(SETTINGS_KEY, "{not json")?;
        }

        assert_eq!(store(db).snapshot()?, CompanySettings::default());
        Ok(())
    }

    #[test]
    fn reset_deletes_the_slot_and_cold_load_sees_defaults() -> anyhow::Result<()> {
        let db = open_db();
        let store_a = store(db.clone());
        store_a.update(CompanySettingsUpdate {
            basic_info: Some(crate::models::BasicInfoUpdate {
                name: Some("RENOMEADA LTDA".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })?;

        store_a.reset()?;
        assert_eq!(store_a.snapshot()?, CompanySettings::default());
        assert_eq!(db.lock().unwrap().get_value(SETTINGS_KEY)?, None);

        assert_eq!(store(db).snapshot()?, CompanySettings::default());
        Ok(())
    }

    #[tokio::test]
    async fn oversized_logo_is_rejected_unchanged() -> anyhow::Result<()> {
        let store = store(open_db());
        let err = store
            .import_logo(vec![0u8; 6 * 1024 * 1024], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::LogoTooLarge));
        assert_eq!(store.snapshot()?.branding.logo, "");
        Ok(())
    }

    #[tokio::test]
    async fn non_image_payload_is_rejected_unchanged() -> anyhow::Result<()> {
        let store = store(open_db());
        let err = store
            .import_logo(b"%PDF-1.4".to_vec(), "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::NotAnImage));
        assert_eq!(store.snapshot()?.branding.logo, "");
        Ok(())
    }

    #[tokio::test]
    async fn imported_logo_lands_in_branding_and_storage() -> anyhow::Result<()> {
        let db = open_db();
        let store_a = store(db.clone());
        let encoded = store_a.import_logo(vec![1, 2, 3], "image/png").await?;

        assert_eq!(encoded, "data:image/png;base64,AQID");
        assert_eq!(store_a.snapshot()?.branding.logo, encoded);
        // Persisted, not just in memory.
        assert_eq!(store(db).snapshot()?.branding.logo, encoded);
        Ok(())
    }

    struct FailingEncoder;

    #[async_trait]
    impl ImageEncoder for FailingEncoder {
        async fn encode(&self, _bytes: Vec<u8>, _mime: &str) -> Result<String, ImageError> {
            Err(ImageError::Encode("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn encode_failure_leaves_state_and_allows_retry() -> anyhow::Result<()> {
        let db = open_db();
        let store = SettingsStore::load(db, Box::new(FailingEncoder)).unwrap();

        let err = store.import_logo(vec![1], "image/png").await.unwrap_err();
        assert!(matches!(err, SettingsError::Encode(_)));
        assert_eq!(store.snapshot()?.branding.logo, "");

        // Guard released: the next attempt is not UploadInProgress.
        let err = store.import_logo(vec![1], "image/png").await.unwrap_err();
        assert!(matches!(err, SettingsError::Encode(_)));
        Ok(())
    }

    struct GatedEncoder {
        entered: Mutex<Option<oneshot::Sender<()>>>,
        release: Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl ImageEncoder for GatedEncoder {
        async fn encode(&self, _bytes: Vec<u8>, mime: &str) -> Result<String, ImageError> {
            if let Some(tx) = self.entered.lock().unwrap().take() {
                let _ = tx.send(());
            }
            let release = self.release.lock().unwrap().take();
            if let Some(rx) = release {
                let _ = rx.await;
            }
            Ok(format!("data:{mime};base64,gated"))
        }
    }

    #[tokio::test]
    async fn second_upload_is_rejected_while_one_is_in_flight() -> anyhow::Result<()> {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let encoder = GatedEncoder {
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
        };

        let store = Arc::new(SettingsStore::load(open_db(), Box::new(encoder)).unwrap());
        let background = {
            let store = store.clone();
            tokio::spawn(async move { store.import_logo(vec![1, 2], "image/png").await })
        };

        entered_rx.await.unwrap();
        let err = store.import_logo(vec![3], "image/png").await.unwrap_err();
        assert!(matches!(err, SettingsError::UploadInProgress));

        release_tx.send(()).unwrap();
        background.await.unwrap()?;
        assert_eq!(store.snapshot()?.branding.logo, "data:image/png;base64,gated");
        Ok(())
    }
}
