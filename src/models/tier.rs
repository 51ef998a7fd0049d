// ============================================================================
// Enums : Tier et Trend
// ============================================================================
// Classification qualitative d'un prix par rapport à la plage du jour
//
// CONCEPT RUST : Enums sans données
// - Copy : aussi léger qu'un entier
// - match exhaustif : impossible d'oublier un glyphe
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::PricePoint;

/// Palier de prix relatif au pic et au creux du jour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Pic extrême (tout proche du maximum sur une journée volatile)
    Spike,
    /// Prix élevé
    High,
    /// Rien de notable
    Neutral,
    /// Prix bas
    Low,
    /// Creux (heure la moins chère ou toute proche)
    Trough,
}

impl Tier {
    /// Glyphe ajouté en fin de ligne (None pour Neutral)
    pub fn glyph(&self) -> Option<&'static str> {
        match self {
            Tier::Spike => Some("‼\u{FE0F}"),
            Tier::High => Some("❗"),
            Tier::Neutral => None,
            Tier::Low => Some("🌱"),
            Tier::Trough => Some("⭐"),
        }
    }
}

/// Évolution par rapport au prix de l'heure précédente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    /// Compare deux prix consécutifs
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Trend::Up
        } else if current < previous {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Trend::Up => "📈",
            Trend::Down => "📉",
            Trend::Flat => "⬜",
        }
    }
}

/// Un prix avec son palier et sa tendance
///
/// `trend` vaut None pour le premier point (affiché comme "Now")
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedPoint {
    pub point: PricePoint,
    pub tier: Tier,
    pub trend: Option<Trend>,
}
