// ============================================================================
// ReportFormatter : rendu texte du rapport de prix
// ============================================================================
// Transforme une série de prix en un bloc de texte multi-lignes annoté :
//
//   ⚠️ avertissement (optionnel, données en cache)
//   💡 | Now   - €0.20 ❗
//   🌄 | 📈 07:00 - €0.25 ❗
//   🌄 | 📉 08:00 - €0.10 ⭐
//   🌑 | —— 11 Mar ——
//   🌑 | 📈 00:00 - €0.18
//
// CONCEPTS RUST :
// 1. Fonction pure : pas d'horloge ni d'état caché, même entrée → même sortie
// 2. Générique sur TimeZone : les tests rendent en UTC, le binaire en heure locale
// 3. Display : le rapport s'affiche directement avec {}
// ============================================================================

use std::fmt;

use anyhow::{bail, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ClassifiedPoint, PriceSeries};
use crate::report::icons::TimeOfDayIcons;
use crate::report::thresholds::{classify_series, Thresholds};

/// Marqueur de la ligne "prix actuel"
const NOW_MARKER: &str = "💡";

/// Icône des lignes de changement de jour
const SEPARATOR_ICON: &str = "🌑";

/// Configuration du rendu, passée explicitement au formatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Symbole monétaire placé devant le prix
    pub currency_symbol: String,

    /// Séparateur décimal ('.' ou ',')
    pub decimal_separator: char,

    /// Seuils de classification
    pub thresholds: Thresholds,

    /// Icônes de moment de la journée
    pub time_icons: TimeOfDayIcons,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "€".to_string(),
            decimal_separator: '.',
            thresholds: Thresholds::default(),
            time_icons: TimeOfDayIcons::default(),
        }
    }
}

impl FormatterConfig {
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;

        if !self.time_icons.hours_are_valid() {
            bail!("Les heures de la table d'icônes doivent être comprises entre 0 et 23");
        }
        if self.decimal_separator.is_ascii_digit() {
            bail!("Séparateur décimal invalide : '{}'", self.decimal_separator);
        }
        Ok(())
    }

    /// Formate un prix : symbole + 2 décimales, séparateur configurable
    pub fn format_price(&self, price: f64) -> String {
        // Évite "-0.00" pour les prix négatifs arrondis à zéro
        let price = if price.abs() < 0.005 { 0.0 } else { price };

        let mut number = format!("{:.2}", price);
        if self.decimal_separator != '.' {
            number = number.replace('.', &self.decimal_separator.to_string());
        }
        format!("{}{}", self.currency_symbol, number)
    }
}

/// Type d'une ligne du rapport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Avertissement (données en cache)
    Warning,
    /// Changement de jour calendaire
    DaySeparator,
    /// Prix de l'heure en cours
    Current,
    /// Prix d'une heure à venir
    Hour,
}

/// Une ligne rendue (sans le retour à la ligne final)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub kind: LineKind,
    pub text: String,
}

/// Rapport complet, dans l'ordre d'affichage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub lines: Vec<ReportLine>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Nombre de lignes d'un type donné
    pub fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }

    /// Texte complet : chaque ligne terminée par '\n'
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    fn push(&mut self, kind: LineKind, text: String) {
        self.lines.push(ReportLine { kind, text });
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

/// Formatter de rapport : classification + rendu
///
/// CONCEPT RUST : Send + Sync
/// - Aucun état mutable : on peut le partager entre threads sans Mutex
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    config: FormatterConfig,
}

impl ReportFormatter {
    /// Crée un formatter après validation de la configuration
    pub fn new(config: FormatterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Classe chaque point de la série (palier + tendance)
    pub fn classify(&self, series: &PriceSeries) -> Vec<ClassifiedPoint> {
        classify_series(series, &self.config.thresholds)
    }

    /// Rendu en heure locale
    pub fn render(&self, series: &PriceSeries, now: DateTime<Utc>, warning: Option<&str>) -> Report {
        self.render_in(series, now, warning, &Local)
    }

    /// Rendu dans un fuseau horaire explicite
    ///
    /// - `warning` non vide → première ligne, telle quelle
    /// - premier point → ligne "Now", sans tendance
    /// - changement de jour calendaire entre deux points consécutifs → ligne
    ///   séparatrice avant le premier point du nouveau jour
    ///
    /// `_now` ne modifie pas le rendu : la série est affichée telle quelle, même
    /// en cache d'un autre jour (l'avertissement le signale déjà)
    pub fn render_in<Tz: TimeZone>(
        &self,
        series: &PriceSeries,
        _now: DateTime<Utc>,
        warning: Option<&str>,
        tz: &Tz,
    ) -> Report {
        let mut report = Report::default();

        if let Some(warning) = warning.filter(|w| !w.is_empty()) {
            report.push(LineKind::Warning, warning.to_string());
        }

        let mut previous_day: Option<NaiveDate> = None;

        for (index, classified) in self.classify(series).iter().enumerate() {
            let local = classified.point.timestamp.with_timezone(tz);
            let day = local.date_naive();

            let new_day = previous_day
                .map(|prev| prev.year() != day.year() || prev.ordinal() != day.ordinal())
                .unwrap_or(false);
            if new_day {
                report.push(LineKind::DaySeparator, self.separator_line(day));
            }
            previous_day = Some(day);

            if index == 0 {
                report.push(LineKind::Current, self.current_line(classified));
            } else {
                report.push(
                    LineKind::Hour,
                    self.hour_line(classified, local.hour(), local.minute()),
                );
            }
        }

        report
    }

    fn current_line(&self, classified: &ClassifiedPoint) -> String {
        format!(
            "{} | Now   - {}{}",
            NOW_MARKER,
            self.config.format_price(classified.point.price),
            tier_suffix(classified)
        )
    }

    fn hour_line(&self, classified: &ClassifiedPoint, hour: u32, minute: u32) -> String {
        let icon = self.config.time_icons.for_hour(hour).unwrap_or(" ");
        // Le premier point est le seul sans tendance
        let trend = classified.trend.map(|t| t.glyph()).unwrap_or("⬜");

        format!(
            "{} | {} {:02}:{:02} - {}{}",
            icon,
            trend,
            hour,
            minute,
            self.config.format_price(classified.point.price),
            tier_suffix(classified)
        )
    }

    fn separator_line(&self, day: NaiveDate) -> String {
        format!("{} | —— {} ——", SEPARATOR_ICON, day.format("%-d %b"))
    }
}

fn tier_suffix(classified: &ClassifiedPoint) -> String {
    classified
        .tier
        .glyph()
        .map(|g| format!(" {}", g))
        .unwrap_or_default()
}

// ============================================================================
// Tests unitaires
// ============================================================================
