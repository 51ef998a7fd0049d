// ============================================================================
// Cache des derniers prix valides
// ============================================================================
// Quand l'API est indisponible, on affiche la dernière série récupérée avec
// un avertissement plutôt qu'une notification vide.
//
// Emplacement par défaut :
// - Linux : ~/.local/share/prijswijs/last_prices.json
// - macOS : ~/Library/Application Support/prijswijs/last_prices.json
// ============================================================================

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::models::PriceSeries;

const CACHE_FILE: &str = "last_prices.json";

/// Contenu du fichier de cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPrices {
    /// Moment où la série a été récupérée
    pub fetched_at: DateTime<Utc>,
    pub series: PriceSeries,
}

/// Cache sur disque (un seul fichier JSON)
#[derive(Debug, Clone)]
pub struct PriceCache {
    path: PathBuf,
}

impl PriceCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache dans le répertoire de données de l'utilisateur
    pub fn in_data_dir() -> Result<Self> {
        let dir = crate::data_dir()?;
        Ok(Self::new(dir.join(CACHE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Écrit la série (remplace le contenu précédent)
    pub async fn save(&self, series: &PriceSeries, fetched_at: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Échec de la création du répertoire de cache")?;
        }

        let cached = CachedPrices {
            fetched_at,
            series: series.clone(),
        };
        let json = serde_json::to_string_pretty(&cached).context("Échec de la sérialisation du cache")?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("Échec de l'écriture du cache {}", self.path.display()))?;

        debug!(path = %self.path.display(), points = series.len(), "Saved prices to cache");
        Ok(())
    }

    /// Lit la dernière série ; Ok(None) si aucun cache n'existe encore
    pub async fn load(&self) -> Result<Option<CachedPrices>> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No price cache yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Échec de la lecture du cache {}", self.path.display()))
            }
        };
        let cached: CachedPrices =
            serde_json::from_str(&json).context("Cache des prix corrompu")?;

        info!(
            fetched_at = %cached.fetched_at,
            points = cached.series.len(),
            "Loaded prices from cache"
        );
        Ok(Some(cached))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::TimeZone;
    use tempfile::{tempdir, TempDir};

    /// Le TempDir doit rester vivant pendant tout le test
    fn temp_cache() -> (TempDir, PriceCache) {
        let dir = tempdir().unwrap();
        let cache = PriceCache::new(dir.path().join("nested").join(CACHE_FILE));
        (dir, cache)
    }

    #[tokio::test]
    async fn test_load_missing_cache() {
        let (_dir, cache) = temp_cache();
        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (_dir, cache) = temp_cache();
        let fetched_at = Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap();
        let series = PriceSeries::new(vec![
            PricePoint::new(fetched_at, 0.21),
            PricePoint::new(fetched_at + chrono::Duration::hours(1), 0.17),
        ]);

        // Le répertoire parent n'existe pas encore : save le crée
        cache.save(&series, fetched_at).await.unwrap();
        let cached = cache.load().await.unwrap().unwrap();

        assert_eq!(cached.fetched_at, fetched_at);
        assert_eq!(cached.series, series);
        assert_eq!(cached.series.trough(), 0.17);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_series() {
        let (_dir, cache) = temp_cache();
        let first = Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap();
        let second = first + chrono::Duration::hours(1);

        cache
            .save(&PriceSeries::new(vec![PricePoint::new(first, 0.30)]), first)
            .await
            .unwrap();
        cache
            .save(&PriceSeries::new(vec![PricePoint::new(second, 0.12)]), second)
            .await
            .unwrap();

        let cached = cache.load().await.unwrap().unwrap();
        assert_eq!(cached.fetched_at, second);
        assert_eq!(cached.series.len(), 1);
        assert_eq!(cached.series.peak(), 0.12);
    }

    #[tokio::test]
    async fn test_corrupted_cache() {
        let (_dir, cache) = temp_cache();
        std::fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        std::fs::write(cache.path(), "not json").unwrap();

        assert!(cache.load().await.is_err());
    }
}
