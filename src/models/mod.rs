// ============================================================================
// Module : models
// ============================================================================
// Structures de données : prix horaires, série du jour, paliers et tendances
// ============================================================================

pub mod price; // PricePoint, PriceSeries
pub mod tier;  // Tier, Trend, ClassifiedPoint

// Re-export des structures principales pour simplifier les imports
// On peut faire : use prijswijs::models::PriceSeries;
pub use price::{PricePoint, PriceSeries};
pub use tier::{ClassifiedPoint, Tier, Trend};
