// ============================================================================
// Settings : configuration utilisateur
// ============================================================================
// Chargée depuis un fichier JSON ; tous les champs sont optionnels.
//
// Emplacement par défaut :
// - Linux : ~/.config/prijswijs/settings.json
// - macOS : ~/Library/Application Support/prijswijs/settings.json
//
// Exemple :
// {
//   "poll_hourly": true,
//   "formatter": { "decimal_separator": ",", "thresholds": { "min_range": 0.08 } }
// }
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::report::FormatterConfig;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rafraîchir toutes les heures au lieu de s'arrêter après une notification
    pub poll_hourly: bool,

    /// Prix BTW (TVA) incluse
    pub include_vat: bool,

    /// Rendu du rapport
    pub formatter: FormatterConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_hourly: false,
            include_vat: true,
            formatter: FormatterConfig::default(),
        }
    }
}

impl Settings {
    /// Chemin par défaut du fichier de settings
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Répertoire de configuration introuvable")?;
        Ok(dir.join(crate::APP_NAME).join(SETTINGS_FILE))
    }

    /// Charge les settings ; fichier absent → valeurs par défaut
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let json = fs::read_to_string(path)
            .with_context(|| format!("Échec de la lecture de {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&json)
            .with_context(|| format!("Settings invalides dans {}", path.display()))?;
        settings
            .formatter
            .validate()
            .with_context(|| format!("Configuration du rapport invalide dans {}", path.display()))?;

        info!(path = %path.display(), poll_hourly = settings.poll_hourly, "Settings loaded");
        Ok(settings)
    }
}
