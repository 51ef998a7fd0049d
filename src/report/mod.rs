// ============================================================================
// Module : report
// ============================================================================
// Classification des prix (paliers relatifs à la plage du jour) et rendu du
// rapport texte affiché dans la notification
// ============================================================================

pub mod formatter;  // ReportFormatter, Report, FormatterConfig
pub mod icons;      // Icônes de moment de la journée
pub mod thresholds; // Seuils et classification

pub use formatter::{FormatterConfig, LineKind, Report, ReportFormatter, ReportLine};
pub use icons::TimeOfDayIcons;
pub use thresholds::{classify_price, classify_series, Boundaries, Thresholds};
