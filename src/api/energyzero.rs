// ============================================================================
// API Client : EnergyZero
// ============================================================================
// Récupère les prix spot day-ahead de l'électricité (Pays-Bas) depuis
// l'API publique EnergyZero : une entrée par heure, aujourd'hui + demain
// (les prix de demain sont publiés vers 13h)
//
// CONCEPTS RUST :
// 1. async/await : l'appel HTTP ne bloque pas le thread
// 2. Serde : désérialisation JSON, dates RFC 3339 → DateTime<Utc>
// 3. anyhow::Context : chaque étape ajoute son message d'erreur
// ============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::api::PriceSource;
use crate::models::{PricePoint, PriceSeries};

const ENERGYZERO_URL: &str = "https://api.energyzero.nl/v1/energyprices";

/// Intervalle horaire dans la nomenclature EnergyZero
const HOURLY_INTERVAL: u8 = 4;

/// Type d'usage : électricité
const USAGE_ELECTRICITY: u8 = 1;

// ============================================================================
// Structures pour parser la réponse JSON
// ============================================================================

/// Réponse de /v1/energyprices
#[derive(Debug, Deserialize)]
struct EnergyZeroResponse {
    #[serde(rename = "Prices", default)]
    prices: Vec<EnergyZeroPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnergyZeroPrice {
    price: f64,
    reading_date: DateTime<Utc>,
}

// ============================================================================
// Fonctions publiques de l'API
// ============================================================================

/// Récupère les prix de l'heure en cours jusqu'à la fin de demain
///
/// # Arguments
/// * `now` - Instant de référence (début de la fenêtre = minuit local)
/// * `include_vat` - Prix TTC (BTW inclus) ou HT
///
/// # Retourne
/// * `Result<PriceSeries>` - Série commençant à l'heure en cours, ou erreur
///   si l'API ne répond pas ou ne contient aucun prix à venir
#[instrument]
pub async fn fetch_energy_prices(now: DateTime<Utc>, include_vat: bool) -> Result<PriceSeries> {
    let url = build_energyzero_url(now, &Local, include_vat)?;
    debug!(url = %url, "Built EnergyZero API URL");

    let client = reqwest::Client::builder()
        .user_agent(concat!("prijswijs/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("Échec de la création du client HTTP")?;

    debug!("Sending HTTP request to EnergyZero");
    let response = client
        .get(&url)
        .send()
        .await
        .context("Échec de la requête HTTP vers EnergyZero")?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    if !status.is_success() {
        error!(status = %status, "EnergyZero returned error status");
        anyhow::bail!("EnergyZero a retourné une erreur : HTTP {}", status);
    }

    let body: EnergyZeroResponse = response
        .json()
        .await
        .context("Échec du parsing JSON de la réponse EnergyZero")?;

    let series = parse_energyzero_response(body, now)?;
    info!(
        points = series.len(),
        peak = series.peak(),
        trough = series.trough(),
        "Successfully fetched energy prices"
    );
    Ok(series)
}

/// Construit l'URL : de minuit (local) aujourd'hui à demain 23:59:59.999
fn build_energyzero_url<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz, include_vat: bool) -> Result<String> {
    let today = now.with_timezone(tz).date_naive();
    let tomorrow = today + Duration::days(1);

    let from = tz
        .from_local_datetime(&today.and_hms_opt(0, 0, 0).context("Heure invalide")?)
        .earliest()
        .context("Minuit local introuvable (changement d'heure ?)")?
        .with_timezone(&Utc);
    let till = tz
        .from_local_datetime(&tomorrow.and_hms_milli_opt(23, 59, 59, 999).context("Heure invalide")?)
        .latest()
        .context("Fin de journée locale introuvable")?
        .with_timezone(&Utc);

    Ok(format!(
        "{}?fromDate={}&tillDate={}&interval={}&usageType={}&inclBtw={}",
        ENERGYZERO_URL,
        from.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        till.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        HOURLY_INTERVAL,
        USAGE_ELECTRICITY,
        include_vat
    ))
}

/// Convertit la réponse en série, sans les heures déjà écoulées
fn parse_energyzero_response(response: EnergyZeroResponse, now: DateTime<Utc>) -> Result<PriceSeries> {
    let total = response.prices.len();
    let points: Vec<PricePoint> = response
        .prices
        .into_iter()
        .map(|p| PricePoint::new(p.reading_date, p.price))
        .collect();

    let series = PriceSeries::new(points).upcoming(now);
    debug!(total, upcoming = series.len(), "Parsed EnergyZero prices");

    if series.is_empty() {
        error!(total, "No current or upcoming prices in EnergyZero response");
        anyhow::bail!("Aucun prix disponible pour l'heure en cours ({} reçus)", total);
    }

    Ok(series)
}

/// Source de prix réelle, utilisée par le service
#[derive(Debug, Clone, Copy)]
pub struct EnergyZeroSource {
    pub include_vat: bool,
}

impl PriceSource for EnergyZeroSource {
    async fn fetch(&self, now: DateTime<Utc>) -> Result<PriceSeries> {
        fetch_energy_prices(now, self.include_vat).await
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_build_url_in_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 0).unwrap();
        let url = build_energyzero_url(now, &Utc, true).unwrap();

        assert!(url.starts_with("https://api.energyzero.nl/v1/energyprices?"));
        assert!(url.contains("fromDate=2024-03-10T00:00:00.000Z"));
        assert!(url.contains("tillDate=2024-03-11T23:59:59.999Z"));
        assert!(url.contains("interval=4"));
        assert!(url.contains("usageType=1"));
        assert!(url.contains("inclBtw=true"));
    }

    #[test]
    fn test_build_url_uses_local_midnight() {
        // Amsterdam en hiver : UTC+1, minuit local = 23:00 UTC la veille
        let cet = FixedOffset::east_opt(3600).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap(); // 00:30 le 16 en local
        let url = build_energyzero_url(now, &cet, false).unwrap();

        assert!(url.contains("fromDate=2024-01-15T23:00:00.000Z"));
        assert!(url.contains("tillDate=2024-01-17T22:59:59.999Z"));
        assert!(url.contains("inclBtw=false"));
    }

    #[test]
    fn test_parse_response_drops_elapsed_hours() {
        let json = r#"{
            "Prices": [
                {"price": 0.31, "readingDate": "2024-03-10T12:00:00Z"},
                {"price": 0.22, "readingDate": "2024-03-10T13:00:00Z"},
                {"price": 0.18, "readingDate": "2024-03-10T14:00:00Z"}
            ],
            "intervalType": 4,
            "average": 0.24
        }"#;
        let response: EnergyZeroResponse = serde_json::from_str(json).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 13, 15, 0).unwrap();

        let series = parse_energyzero_response(response, now).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.peak(), 0.22);
        assert_eq!(series.trough(), 0.18);
    }

    #[test]
    fn test_parse_response_without_upcoming_prices() {
        let json = r#"{"Prices": [{"price": 0.31, "readingDate": "2024-03-10T12:00:00Z"}]}"#;
        let response: EnergyZeroResponse = serde_json::from_str(json).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();

        assert!(parse_energyzero_response(response, now).is_err());

        let empty: EnergyZeroResponse = serde_json::from_str("{}").unwrap();
        assert!(parse_energyzero_response(empty, now).is_err());
    }

    // Test avec un vrai appel API (peut échouer si pas de connexion)
    #[tokio::test]
    async fn test_fetch_energy_prices() {
        match fetch_energy_prices(Utc::now(), true).await {
            Ok(series) => {
                assert!(!series.is_empty());
                assert!(series.peak() >= series.trough());
                println!("✓ Récupéré {} prix horaires", series.len());
            }
            Err(e) => {
                println!("⚠ Test skippé (pas de connexion?) : {}", e);
            }
        }
    }
}
