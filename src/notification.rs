// ============================================================================
// Notification : surface d'affichage du rapport
// ============================================================================
// La notification finale contient un titre, le rapport texte et un drapeau
// d'erreur qui sélectionne un style visuel distinct.
//
// CONCEPT RUST : Trait Notifier
// - Le service ne connaît que le trait
// - TerminalNotifier affiche dans le terminal (couleurs via crossterm)
// - Les tests utilisent un notifier qui mémorise les notifications
// ============================================================================

use std::io::{self, Write};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};

pub const PRICES_TITLE: &str = "⚡ Today's Energy Prices ⚡";

/// Notification prête à être affichée
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub is_error: bool,
}

impl Notification {
    /// Notification normale avec le rapport de prix
    pub fn prices(body: String) -> Self {
        Self {
            title: PRICES_TITLE.to_string(),
            body,
            is_error: false,
        }
    }

    /// Notification d'échec (aucun prix, même en cache)
    pub fn error(reason: &str) -> Self {
        Self {
            title: PRICES_TITLE.to_string(),
            body: format!("⚠️ Failed to update prices. ⚠️\n{}", reason),
            is_error: true,
        }
    }
}

/// Destination des notifications
pub trait Notifier {
    fn notify(&mut self, notification: &Notification) -> Result<()>;
}

/// Affiche les notifications sur la sortie standard
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier {
    /// Sans couleurs ni styles (redirection vers un fichier, etc.)
    pub plain: bool,
}

impl TerminalNotifier {
    pub fn new(plain: bool) -> Self {
        Self { plain }
    }

    fn write_to(&self, out: &mut impl Write, notification: &Notification) -> Result<()> {
        if self.plain {
            writeln!(out, "{}", notification.title)?;
            write!(out, "{}", notification.body)?;
            if !notification.body.ends_with('\n') {
                writeln!(out)?;
            }
            return Ok(());
        }

        let body_color = if notification.is_error {
            Color::Red
        } else {
            Color::Reset
        };

        execute!(
            out,
            SetAttribute(Attribute::Bold),
            Print(&notification.title),
            SetAttribute(Attribute::Reset),
            Print("\n"),
            SetForegroundColor(body_color),
            Print(&notification.body),
            ResetColor,
        )?;
        if !notification.body.ends_with('\n') {
            writeln!(out)?;
        }
        Ok(())
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notification: &Notification) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_to(&mut out, notification)
            .context("Échec de l'affichage de la notification")?;
        out.flush()?;
        Ok(())
    }
}
