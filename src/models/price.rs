// ============================================================================
// Structures : PricePoint et PriceSeries
// ============================================================================
// Représente les prix spot horaires de l'électricité (day-ahead)
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : instant absolu, le fuseau horaire n'intervient qu'au rendu
// 2. f64 : prix en €/kWh (précision largement suffisante)
// 3. Invariants garantis par le constructeur : la série n'est jamais modifiée
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Un prix horaire : le prix s'applique de `timestamp` à `timestamp + 1h`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Début de l'heure concernée
    pub timestamp: DateTime<Utc>,

    /// Prix en €/kWh
    pub price: f64,
}

impl PricePoint {
    /// Constructeur
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Fin de l'heure couverte par ce prix
    pub fn end(&self) -> DateTime<Utc> {
        self.timestamp + Duration::hours(1)
    }

    /// Vrai si l'heure de ce prix est entièrement passée à `now`
    pub fn has_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.end() <= now
    }
}

/// Série ordonnée de prix avec le pic (peak) et le creux (trough) du jour
///
/// CONCEPT RUST : Champs privés + accesseurs
/// - Impossible de construire une série qui viole `peak >= price >= trough`
/// - Impossible de modifier la série après construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
    peak: f64,
    trough: f64,
}

impl PriceSeries {
    /// Construit une série à partir de points quelconques
    ///
    /// - Trie par timestamp croissant
    /// - Supprime les doublons de timestamp (garde le premier)
    /// - Ignore les prix non finis (NaN, infini)
    /// - Calcule peak/trough ; une série vide a peak == trough == 0.0
    pub fn new(points: Vec<PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.price.is_finite())
            .collect();

        // sort_by_key est stable : le premier point d'un timestamp reste devant
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);

        let peak = points
            .iter()
            .map(|p| p.price)
            .fold(f64::NEG_INFINITY, f64::max);
        let trough = points
            .iter()
            .map(|p| p.price)
            .fold(f64::INFINITY, f64::min);

        if points.is_empty() {
            return Self {
                points,
                peak: 0.0,
                trough: 0.0,
            };
        }

        Self {
            points,
            peak,
            trough,
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Prix maximum de la série
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Prix minimum de la série
    pub fn trough(&self) -> f64 {
        self.trough
    }

    /// Écart entre le pic et le creux (toujours >= 0)
    pub fn range(&self) -> f64 {
        self.peak - self.trough
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Retourne une nouvelle série sans les heures déjà écoulées à `now`
    ///
    /// CONCEPT : la série d'origine n'est pas modifiée, on en construit une autre
    /// (peak/trough sont recalculés sur la fenêtre restante)
    pub fn upcoming(&self, now: DateTime<Utc>) -> PriceSeries {
        PriceSeries::new(
            self.points
                .iter()
                .filter(|p| !p.has_elapsed(now))
                .copied()
                .collect(),
        )
    }
}

impl From<Vec<PricePoint>> for PriceSeries {
    fn from(points: Vec<PricePoint>) -> Self {
        PriceSeries::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_peak_and_trough() {
        let series = PriceSeries::new(vec![
            PricePoint::new(at(0), 0.20),
            PricePoint::new(at(1), 0.25),
            PricePoint::new(at(2), 0.10),
        ]);

        assert_eq!(series.peak(), 0.25);
        assert_eq!(series.trough(), 0.10);
        assert!((series.range() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let series = PriceSeries::new(vec![
            PricePoint::new(at(2), 0.30),
            PricePoint::new(at(0), 0.10),
            PricePoint::new(at(2), 0.99),
            PricePoint::new(at(1), 0.20),
        ]);

        let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![0.10, 0.20, 0.30]);
        assert_eq!(series.peak(), 0.30);
    }

    #[test]
    fn test_non_finite_prices_are_dropped() {
        let series = PriceSeries::new(vec![
            PricePoint::new(at(0), f64::NAN),
            PricePoint::new(at(1), 0.12),
            PricePoint::new(at(2), f64::INFINITY),
        ]);

        assert_eq!(series.len(), 1);
        assert_eq!(series.peak(), 0.12);
        assert_eq!(series.trough(), 0.12);
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::new(Vec::new());
        assert!(series.is_empty());
        assert_eq!(series.peak(), 0.0);
        assert_eq!(series.trough(), 0.0);
        assert_eq!(series.range(), 0.0);
    }

    #[test]
    fn test_upcoming_keeps_current_hour() {
        let series = PriceSeries::new(vec![
            PricePoint::new(at(0), 0.40),
            PricePoint::new(at(1), 0.20),
            PricePoint::new(at(2), 0.30),
        ]);

        // 01:30 : l'heure 00:00 est passée, l'heure 01:00 est en cours
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 1, 30, 0).unwrap();
        let upcoming = series.upcoming(now);

        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming.points()[0].timestamp, at(1));
        assert_eq!(upcoming.peak(), 0.30);
    }

    #[test]
    fn test_serde_keeps_invariants() {
        let series = PriceSeries::new(vec![
            PricePoint::new(at(1), 0.20),
            PricePoint::new(at(0), 0.10),
        ]);

        let json = serde_json::to_string(&series).unwrap();
        let restored: PriceSeries = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, series);
        assert_eq!(restored.trough(), 0.10);
    }
}
