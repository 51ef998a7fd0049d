// ============================================================================
// PriceService : récupération → rapport → notification
// ============================================================================
// Un cycle :
// 1. Récupère les prix (API) ; en cas d'échec, repli sur le cache + avertissement
// 2. Construit le rapport avec le ReportFormatter
// 3. Publie la notification (ou une notification d'erreur si rien n'est disponible)
//
// Mode horaire : un cycle, puis attente jusqu'à la prochaine heure pleine,
// jusqu'à Ctrl-C. Chaque cycle est indépendant : rien à annuler en cours de route.
// ============================================================================

use anyhow::Result;
use chrono::{DateTime, Duration, DurationRound, Utc};
use tracing::{debug, error, info, warn};

use crate::api::PriceSource;
use crate::cache::PriceCache;
use crate::models::PriceSeries;
use crate::notification::{Notification, Notifier};
use crate::report::{LineKind, ReportFormatter};

/// Résultat d'une récupération de prix
#[derive(Debug, Clone, PartialEq)]
pub enum PriceFetch {
    /// Prix frais de l'API
    Fresh(PriceSeries),
    /// Prix en cache, avec la raison à afficher en avertissement
    Fallback { series: PriceSeries, reason: String },
}

impl PriceFetch {
    pub fn series(&self) -> &PriceSeries {
        match self {
            PriceFetch::Fresh(series) => series,
            PriceFetch::Fallback { series, .. } => series,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            PriceFetch::Fresh(_) => None,
            PriceFetch::Fallback { reason, .. } => Some(reason.as_str()),
        }
    }
}

pub struct PriceService<S, N> {
    source: S,
    notifier: N,
    cache: Option<PriceCache>,
    formatter: ReportFormatter,
}

impl<S: PriceSource, N: Notifier> PriceService<S, N> {
    /// `cache` à None désactive le repli sur les derniers prix
    pub fn new(source: S, notifier: N, cache: Option<PriceCache>, formatter: ReportFormatter) -> Self {
        Self {
            source,
            notifier,
            cache,
            formatter,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Récupère les prix, avec repli sur le cache si l'API échoue
    ///
    /// - Succès : la série est écrite dans le cache (échec d'écriture non bloquant)
    /// - Échec + cache : Fallback avec un avertissement daté
    /// - Échec sans cache : l'erreur de l'API est propagée
    pub async fn fetch_with_fallback(&self, now: DateTime<Utc>) -> Result<PriceFetch> {
        let error = match self.source.fetch(now).await {
            Ok(series) => {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.save(&series, now).await {
                        warn!(error = ?e, "Failed to update price cache");
                    }
                }
                return Ok(PriceFetch::Fresh(series));
            }
            Err(e) => e,
        };

        warn!(error = ?error, "Price fetch failed, trying cache");

        let Some(cache) = &self.cache else {
            return Err(error);
        };
        let cached = match cache.load().await {
            Ok(Some(cached)) if !cached.series.is_empty() => cached,
            Ok(_) => return Err(error),
            Err(cache_error) => {
                warn!(error = ?cache_error, "Price cache unreadable");
                return Err(error);
            }
        };

        // Heures déjà passées retirées, sauf si plus rien ne reste
        let upcoming = cached.series.upcoming(now);
        let series = if upcoming.is_empty() {
            cached.series
        } else {
            upcoming
        };

        let reason = format!(
            "⚠️ Prices unavailable, showing cached prices from {}. ⚠️",
            cached.fetched_at.with_timezone(&chrono::Local).format("%-d %b %H:%M")
        );
        Ok(PriceFetch::Fallback { series, reason })
    }

    /// Construit la notification pour `now` (jamais d'erreur : échec → notification d'erreur)
    pub async fn build_notification(&self, now: DateTime<Utc>) -> Notification {
        match self.fetch_with_fallback(now).await {
            Ok(fetch) => {
                let report = self.formatter.render(fetch.series(), now, fetch.warning());
                debug!(
                    lines = report.lines.len(),
                    separators = report.count(LineKind::DaySeparator),
                    "Report rendered"
                );
                Notification::prices(report.to_text())
            }
            Err(e) => {
                error!(error = ?e, "No prices available");
                Notification::error(&format!("{:#}", e))
            }
        }
    }

    /// Un cycle complet : récupération, rendu, notification
    pub async fn run_once(&mut self, now: DateTime<Utc>) -> Result<()> {
        let notification = self.build_notification(now).await;
        self.notifier.notify(&notification)?;
        info!(is_error = notification.is_error, "Notification shown");
        Ok(())
    }

    /// Rafraîchit à chaque heure pleine jusqu'à Ctrl-C
    pub async fn run_hourly(&mut self) -> Result<()> {
        loop {
            let now = Utc::now();
            if let Err(e) = self.run_once(now).await {
                error!(error = ?e, "Notification failed");
            }

            let next = next_hour_boundary(Utc::now());
            let wait = (next - Utc::now()).to_std().unwrap_or_default();
            info!(next = %next, wait_secs = wait.as_secs(), "Sleeping until next hour");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received, stopping hourly updates");
                    return Ok(());
                }
            }
        }
    }
}

/// Prochaine heure pleine strictement après `now`
pub fn next_hour_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let hour = Duration::hours(1);
    match now.duration_trunc(hour) {
        Ok(start) => start + hour,
        Err(_) => now + hour,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::TimeZone;
    use tempfile::{tempdir, TempDir};

    /// Source en mémoire : Some(série) ou None pour simuler une panne
    struct FakeSource(Option<PriceSeries>);

    impl PriceSource for FakeSource {
        async fn fetch(&self, _now: DateTime<Utc>) -> Result<PriceSeries> {
            self.0
                .clone()
                .ok_or_else(|| anyhow::anyhow!("EnergyZero a retourné une erreur : HTTP 503"))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier(Vec<Notification>);

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, notification: &Notification) -> Result<()> {
            self.0.push(notification.clone());
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 20, 0).unwrap()
    }

    fn sample_series(start: DateTime<Utc>) -> PriceSeries {
        PriceSeries::new(
            [0.20, 0.25, 0.10]
                .iter()
                .enumerate()
                .map(|(i, &p)| PricePoint::new(start + Duration::hours(i as i64), p))
                .collect(),
        )
    }

    /// Le TempDir doit rester vivant pendant tout le test
    fn temp_cache() -> (TempDir, PriceCache) {
        let dir = tempdir().unwrap();
        let cache = PriceCache::new(dir.path().join("last_prices.json"));
        (dir, cache)
    }

    fn service(source: FakeSource, cache: Option<PriceCache>) -> PriceService<FakeSource, RecordingNotifier> {
        PriceService::new(source, RecordingNotifier::default(), cache, ReportFormatter::default())
    }

    #[test]
    fn test_next_hour_boundary() {
        let t = Utc.with_ymd_and_hms(2024, 3, 10, 9, 20, 5).unwrap();
        assert_eq!(next_hour_boundary(t), Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap());

        let exact = Utc.with_ymd_and_hms(2024, 3, 10, 23, 0, 0).unwrap();
        assert_eq!(next_hour_boundary(exact), Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_fresh_prices_are_cached() {
        let (_dir, cache) = temp_cache();
        let series = sample_series(now());
        let svc = service(FakeSource(Some(series.clone())), Some(cache.clone()));

        let fetch = svc.fetch_with_fallback(now()).await.unwrap();
        assert_eq!(fetch, PriceFetch::Fresh(series.clone()));
        assert_eq!(cache.load().await.unwrap().unwrap().series, series);
    }

    #[tokio::test]
    async fn test_fallback_to_cache() {
        let (_dir, cache) = temp_cache();
        let yesterday = now() - Duration::days(1);
        cache.save(&sample_series(yesterday), yesterday).await.unwrap();

        let svc = service(FakeSource(None), Some(cache));
        let fetch = svc.fetch_with_fallback(now()).await.unwrap();

        // Toutes les heures en cache sont passées : la série entière est conservée
        assert_eq!(fetch.series().len(), 3);
        assert!(fetch.warning().unwrap().contains("cached prices"));
    }

    #[tokio::test]
    async fn test_fallback_drops_elapsed_hours() {
        let (_dir, cache) = temp_cache();
        let start = now() - Duration::hours(1);
        cache.save(&sample_series(start), start).await.unwrap();

        let svc = service(FakeSource(None), Some(cache));
        let fetch = svc.fetch_with_fallback(now()).await.unwrap();

        // 08:20 → 09:20 : l'heure de 08:20 est terminée
        assert_eq!(fetch.series().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_without_cache() {
        let svc = service(FakeSource(None), None);
        assert!(svc.fetch_with_fallback(now()).await.is_err());

        let (_dir, empty) = temp_cache();
        let svc = service(FakeSource(None), Some(empty));
        assert!(svc.fetch_with_fallback(now()).await.is_err());
    }

    #[tokio::test]
    async fn test_run_once_notifies_report() {
        let mut svc = service(FakeSource(Some(sample_series(now()))), None);
        svc.run_once(now()).await.unwrap();

        let shown = &svc.notifier().0;
        assert_eq!(shown.len(), 1);
        assert!(!shown[0].is_error);
        assert!(shown[0].body.starts_with("💡 | Now"));
        assert_eq!(shown[0].body.lines().filter(|l| l.contains('€')).count(), 3);
    }

    #[tokio::test]
    async fn test_run_once_notifies_error() {
        let mut svc = service(FakeSource(None), None);
        svc.run_once(now()).await.unwrap();

        let shown = &svc.notifier().0;
        assert!(shown[0].is_error);
        assert!(shown[0].body.contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_fallback_report_starts_with_warning() {
        let (_dir, cache) = temp_cache();
        cache.save(&sample_series(now()), now()).await.unwrap();

        let mut svc = service(FakeSource(None), Some(cache));
        svc.run_once(now()).await.unwrap();

        let body = &svc.notifier().0[0].body;
        assert!(body.starts_with("⚠️ Prices unavailable"));
        assert!(!svc.notifier().0[0].is_error);
    }
}
