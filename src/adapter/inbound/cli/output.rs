//! Terminal output for the operator CLI.
//!
//! Handlers print either one JSON document per command (`--json`) or the
//! human form built from the helpers below. In JSON mode the human helpers
//! are silent so stdout stays parseable; warnings and errors go to stderr.
//! `--quiet` keeps only warnings, errors and tables.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::domain::market::MarketStatus;
use crate::domain::settlement::Payout;

/// Output mode chosen by the global CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static MODE: OnceLock<OutputConfig> = OnceLock::new();

fn mode() -> OutputConfig {
    MODE.get().copied().unwrap_or_default()
}

/// Human lines (headers, fields, notes) are printed.
fn chatty() -> bool {
    let mode = mode();
    !mode.json && !mode.quiet
}

/// Set the output mode. Only the first call takes effect.
pub fn configure(config: OutputConfig) {
    let _ = MODE.set(config);
}

#[must_use]
pub fn is_json() -> bool {
    mode().json
}

/// Print the command's result document.
pub fn document(value: serde_json::Value) {
    println!("{value}");
}

pub fn header(version: &str) {
    if chatty() {
        println!("{} {}", "stakeline".bold(), version.dimmed());
        println!();
    }
}

pub fn section(title: &str) {
    if chatty() {
        println!();
        println!("{}", title.bold());
    }
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    if chatty() {
        println!("  {:<14} {}", label.dimmed(), value);
    }
}

pub fn note(message: &str) {
    if chatty() {
        println!("  {}", message.dimmed());
    }
}

pub fn success(message: &str) {
    if chatty() {
        println!("  {} {}", "✓".green(), message);
    }
}

/// Warnings survive `--quiet`; in JSON mode they go to stderr.
pub fn warning(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "warning": message }));
    } else {
        println!("  {} {}", "⚠".yellow(), message);
    }
}

pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "error": message }));
    } else {
        eprintln!("  {} {}", "×".red(), message);
    }
}

/// Render rows as a rounded table.
pub fn table<T: Tabled>(rows: impl IntoIterator<Item = T>) {
    if is_json() {
        return;
    }
    let rendered = Table::new(rows).with(Style::rounded()).to_string();
    for line in rendered.lines() {
        println!("  {line}");
    }
}

/// Token amount without trailing zeros.
#[must_use]
pub fn amount(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Amount colored by sign, for profit and loss.
#[must_use]
pub fn signed(value: Decimal) -> String {
    let text = amount(value);
    if value.is_sign_negative() && !value.is_zero() {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

/// Text for a result that went through.
#[must_use]
pub fn good(value: impl Display) -> String {
    value.to_string().green().to_string()
}

/// Text for a result that needs an operator.
#[must_use]
pub fn bad(value: impl Display) -> String {
    value.to_string().red().to_string()
}

/// Text to pick out of a table, such as teams that advance.
#[must_use]
pub fn emphasis(value: impl Display) -> String {
    value.to_string().cyan().to_string()
}

/// Status colored by lifecycle stage.
#[must_use]
pub fn status(status: MarketStatus) -> String {
    match status {
        MarketStatus::Active => status.as_str().green().to_string(),
        MarketStatus::PendingResolution => status.as_str().yellow().to_string(),
        MarketStatus::Resolved => status.as_str().cyan().to_string(),
        MarketStatus::Cancelled => status.as_str().dimmed().to_string(),
    }
}

/// Fee breakdown of a claimable payout.
pub fn payout(payout: &Payout) {
    field("Gross", amount(payout.gross));
    field("Platform fee", amount(payout.platform_fee));
    field("Creator fee", amount(payout.creator_fee));
    field("Net", good(amount(payout.net)));
}
