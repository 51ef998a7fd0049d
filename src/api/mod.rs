// ============================================================================
// Module : api
// ============================================================================
// Clients API pour récupérer les prix de l'électricité
// ============================================================================

use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::PriceSeries;

pub mod energyzero; // Client API EnergyZero

// Re-export des fonctions principales
pub use energyzero::{fetch_energy_prices, EnergyZeroSource};

/// Source de prix utilisée par le service
///
/// CONCEPT RUST : Trait avec méthode async
/// - Le service est générique sur la source
/// - En test, on remplace l'API par une source en mémoire
pub trait PriceSource {
    /// Prix de l'heure en cours jusqu'à la fin de la fenêtre disponible
    fn fetch(&self, now: DateTime<Utc>) -> impl Future<Output = Result<PriceSeries>> + Send;
}
