// crates/sqlite-gate-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for both binaries.
// Purpose: Keep every user-facing string in one keyed catalog.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! `db-lock` and `db-update` read their user-facing strings from a small
//! keyed catalog. Runtime output goes through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Parses a locale value, ignoring case and any region tag.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.split(['-', '_']).next() {
            Some("en") => Some(Self::En),
            Some("ca") => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Supported locales in presentation order.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A named argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces (for example, `table`).
    pub key: &'static str,
    /// Preformatted value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Locale selected for this process.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the process locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the process locale (English until set).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("i18n.lang.invalid_env", "Invalid {env} value '{value}'. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
    ("lock.locked", "Database locked"),
    ("lock.retry_wait", "Database locked; probe {attempt} failed, retrying in {seconds}s."),
    ("lock.probe_failed", "Failed to check database lock: {error}"),
    ("lock.script.spawn_failed", "Failed to run {script}: {error}"),
    ("update.missing_database", "{env} environment variable is not set."),
    ("update.connect_failed", "Could not connect to database: {error}"),
    ("update.invalid_table", "Invalid table name: {table}"),
    ("update.invalid_column", "Invalid column name: {column}"),
    ("update.invalid_index_column", "Invalid index field name: {column}"),
    ("update.failed", "Failed to write data: {error}"),
    ("update.execute_failed", "Error executing SQL statement: {error}"),
    ("update.verbose.ok", "Data written successfully to the SQLite database."),
    ("update.log.open_failed", "Failed to open log file {path}: {error}"),
    ("update.log.write_failed", "Failed to write log file {path}: {error}"),
];

/// Catalan catalog entries.
const CATALOG_CA: &[(&str, &str)] = &[
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("i18n.lang.invalid_env", "Valor de {env} no vàlid '{value}'. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida en llengües diferents de l'anglès és traduïda automàticament i pot \
         contenir errors.",
    ),
    ("lock.locked", "Base de dades bloquejada"),
    (
        "lock.retry_wait",
        "Base de dades bloquejada; la comprovació {attempt} ha fallat, es reintenta d'aquí a \
         {seconds}s.",
    ),
    ("lock.probe_failed", "No s'ha pogut comprovar el bloqueig de la base de dades: {error}"),
    ("lock.script.spawn_failed", "No s'ha pogut executar {script}: {error}"),
    ("update.missing_database", "La variable d'entorn {env} no està definida."),
    ("update.connect_failed", "No s'ha pogut connectar a la base de dades: {error}"),
    ("update.invalid_table", "Nom de taula no vàlid: {table}"),
    ("update.invalid_column", "Nom de columna no vàlid: {column}"),
    ("update.invalid_index_column", "Nom del camp índex no vàlid: {column}"),
    ("update.failed", "No s'han pogut escriure les dades: {error}"),
    ("update.execute_failed", "Error en executar la sentència SQL: {error}"),
    ("update.verbose.ok", "Dades escrites correctament a la base de dades SQLite."),
    ("update.log.open_failed", "No s'ha pogut obrir el fitxer de registre {path}: {error}"),
    ("update.log.write_failed", "No s'ha pogut escriure el fitxer de registre {path}: {error}"),
];

/// Returns the raw catalog entries for `locale` in declaration order.
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::Ca => CATALOG_CA,
    }
}

/// Returns the lookup map for `locale`.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    let map = match locale {
        Locale::En => &CATALOG_EN_MAP,
        Locale::Ca => &CATALOG_CA_MAP,
    };
    map.get_or_init(|| catalog_entries_for(locale).iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog_for(current_locale())
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    substitute(template, &args)
}

/// Replaces each `{name}` in `template` in a single left-to-right pass.
///
/// Substituted values are never rescanned, so a value containing `{name}`
/// text is emitted verbatim. Unknown or unclosed placeholders stay literal.
fn substitute(template: &str, args: &[MessageArg]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[.. open]);
        let after = &rest[open + 1 ..];
        let value = after.find('}').and_then(|close| {
            let name = &after[.. close];
            args.iter().find(|arg| arg.key == name).map(|arg| (arg.value.as_str(), close))
        });
        match value {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 1 ..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// Named arguments replace `{placeholder}` positions in the template.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
