// ============================================================================
// PrijsWijs - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};

pub mod api;          // API EnergyZero
pub mod cache;        // Cache des derniers prix valides
pub mod models;       // Structures de données
pub mod notification; // Surface d'affichage
pub mod report;       // Classification et rendu du rapport
pub mod service;      // Cycle récupération → rapport → notification
pub mod settings;     // Configuration utilisateur

/// Nom utilisé pour les répertoires de config, données et logs
pub const APP_NAME: &str = "prijswijs";

/// Répertoire de données de l'application (cache, logs)
pub fn data_dir() -> Result<PathBuf> {
    let dir = dirs::data_dir().context("Répertoire de données introuvable")?;
    Ok(dir.join(APP_NAME))
}
