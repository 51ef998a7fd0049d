// ============================================================================
// Icônes de moment de la journée
// ============================================================================
// Table creuse heure → icône. Pour une heure donnée, on prend la première
// entrée à cette heure ou après, en bouclant à minuit :
// 05:00 → entrée de 06h (🌅), 20:00 → entrée de 23h (🌙), 00:00 → entrée de 04h (🌑)
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Table des icônes par heure (0..=23)
///
/// CONCEPT RUST : BTreeMap
/// - Clés triées : `range(hour..)` donne directement la prochaine entrée
/// - Sérialisé en JSON comme un objet {"4": "🌑", ...}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeOfDayIcons(BTreeMap<u32, String>);

impl TimeOfDayIcons {
    pub fn new(entries: BTreeMap<u32, String>) -> Self {
        Self(entries)
    }

    /// Icône pour une heure : entrée à `hour` ou la suivante (cyclique)
    ///
    /// Retourne None si la table est vide
    pub fn for_hour(&self, hour: u32) -> Option<&str> {
        let hour = hour % 24;
        self.0
            .range(hour..)
            .next()
            .or_else(|| self.0.iter().next())
            .map(|(_, icon)| icon.as_str())
    }

    /// Vrai si toutes les heures sont dans 0..=23
    pub fn hours_are_valid(&self) -> bool {
        self.0.keys().all(|&h| h < 24)
    }
}

impl Default for TimeOfDayIcons {
    fn default() -> Self {
        let entries = [
            (4, "🌑"),
            (6, "🌅"),
            (8, "🌄"),
            (16, "☀\u{FE0F}"),
            (19, "🌆"),
            (23, "🌙"),
        ];
        Self(
            entries
                .into_iter()
                .map(|(hour, icon)| (hour, icon.to_string()))
                .collect(),
        )
    }
}
