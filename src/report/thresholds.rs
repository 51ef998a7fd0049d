// ============================================================================
// Classification des prix : seuils relatifs à la plage du jour
// ============================================================================
// Un même prix est "bas" un jour calme et "neutre" un jour volatil :
// tous les seuils sont calculés à partir de range = peak - trough.
//
// ALGORITHME (premier cas qui matche) :
// 0. range < min_range            → Neutral pour tous les points
// 1. prix == trough               → Trough (l'heure la moins chère est toujours signalée)
// 2. prix > peak_near && range > spike_range → Spike
// 3. prix == peak || prix > peak_mid         → High
// 4. prix < trough_near           → Trough
// 5. prix < trough_mid && range > low_range  → Low
// 6. sinon                        → Neutral
// ============================================================================

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::{ClassifiedPoint, PriceSeries, Tier, Trend};

/// Constantes de classification (configurables via les settings)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// En dessous de cette plage (€), le marché est trop plat : tout est Neutral
    pub min_range: f64,

    /// Plage minimale pour afficher le palier Spike
    pub spike_range: f64,

    /// Plage minimale pour afficher le palier Low
    pub low_range: f64,

    /// Fraction de la plage sous le pic pour `peak_near`
    pub peak_near: f64,

    /// Fraction de la plage sous le pic pour `peak_mid`
    pub peak_mid: f64,

    /// Fraction de la plage au-dessus du creux pour `trough_near`
    pub trough_near: f64,

    /// Fraction de la plage au-dessus du creux pour `trough_mid`
    pub trough_mid: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_range: 0.06,
            spike_range: 0.15,
            low_range: 0.10,
            peak_near: 0.1,
            peak_mid: 0.4,
            trough_near: 0.1,
            trough_mid: 0.3,
        }
    }
}

impl Thresholds {
    /// Vérifie que les fractions produisent des bornes ordonnées
    ///
    /// Garantit : peak >= peak_near >= peak_mid >= trough_mid >= trough_near >= trough
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("peak_near", self.peak_near),
            ("peak_mid", self.peak_mid),
            ("trough_near", self.trough_near),
            ("trough_mid", self.trough_mid),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                bail!("Seuil {} hors de [0, 1] : {}", name, value);
            }
        }

        if self.peak_near > self.peak_mid {
            bail!("peak_near ({}) doit être <= peak_mid ({})", self.peak_near, self.peak_mid);
        }
        if self.trough_near > self.trough_mid {
            bail!(
                "trough_near ({}) doit être <= trough_mid ({})",
                self.trough_near,
                self.trough_mid
            );
        }
        if self.peak_mid + self.trough_mid > 1.0 {
            bail!(
                "peak_mid + trough_mid doit être <= 1 (actuel : {})",
                self.peak_mid + self.trough_mid
            );
        }

        for (name, value) in [
            ("min_range", self.min_range),
            ("spike_range", self.spike_range),
            ("low_range", self.low_range),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("Plage {} invalide : {}", name, value);
            }
        }

        Ok(())
    }

    /// Calcule les bornes pour une série
    ///
    /// Retourne None quand la plage n'est pas significative :
    /// dans ce cas tout est Neutral et aucune borne n'est calculée.
    pub fn boundaries(&self, series: &PriceSeries) -> Option<Boundaries> {
        let range = series.range();
        if range <= 0.0 || range < self.min_range {
            return None;
        }

        let peak = series.peak();
        let trough = series.trough();
        Some(Boundaries {
            peak,
            trough,
            range,
            peak_near: peak - self.peak_near * range,
            peak_mid: peak - self.peak_mid * range,
            trough_near: trough + self.trough_near * range,
            trough_mid: trough + self.trough_mid * range,
        })
    }
}

/// Bornes calculées pour une série donnée
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundaries {
    pub peak: f64,
    pub trough: f64,
    pub range: f64,
    pub peak_near: f64,
    pub peak_mid: f64,
    pub trough_near: f64,
    pub trough_mid: f64,
}

/// Détermine le palier d'un prix
///
/// `boundaries` à None (plage non significative) → Neutral
pub fn classify_price(price: f64, boundaries: Option<&Boundaries>, thresholds: &Thresholds) -> Tier {
    let Some(b) = boundaries else {
        return Tier::Neutral;
    };

    if price == b.trough {
        Tier::Trough
    } else if price > b.peak_near && b.range > thresholds.spike_range {
        Tier::Spike
    } else if price == b.peak || price > b.peak_mid {
        Tier::High
    } else if price < b.trough_near {
        Tier::Trough
    } else if price < b.trough_mid && b.range > thresholds.low_range {
        Tier::Low
    } else {
        Tier::Neutral
    }
}

/// Classe tous les points d'une série et calcule les tendances
///
/// CONCEPT RUST : Iterator::scan
/// - Garde le prix précédent comme état entre deux itérations
/// - Le premier point n'a pas de tendance (None)
pub fn classify_series(series: &PriceSeries, thresholds: &Thresholds) -> Vec<ClassifiedPoint> {
    let boundaries = thresholds.boundaries(series);

    series
        .points()
        .iter()
        .scan(None::<f64>, |previous, point| {
            let trend = previous.map(|prev| Trend::between(prev, point.price));
            *previous = Some(point.price);

            Some(ClassifiedPoint {
                point: *point,
                tier: classify_price(point.price, boundaries.as_ref(), thresholds),
                trend,
            })
        })
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================
