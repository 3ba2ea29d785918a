//! Deterministic filename formatting.
//!
//! Turns a set of semantic components plus a date into a sanitized filename
//! stem. Pure string transformation, no I/O; every tie-breaking rule lives
//! here so the rest of the pipeline can treat naming as a black box.

use crate::components::{FilenameComponents, is_null_marker};
use crate::config::NamingConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Stem used when no component survives sanitization.
const FALLBACK_STEM: &str = "unnamed-file";

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid regex"));
static KEBAB_STEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*([-_]\d{8})?$").expect("valid regex"));
static SNAKE_STEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(_[a-z0-9]+)*([-_]\d{8})?$").expect("valid regex"));

/// Case style applied when joining filename parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CaseStyle {
    /// Hyphen-joined lowercase (`annual-report-2024`).
    #[default]
    Kebab,
    /// Underscore-joined lowercase (`annual_report_2024`).
    Snake,
    /// First part lowercase, the rest title-cased, no separator.
    Camel,
    /// Every part title-cased, no separator.
    Pascal,
    /// Alias for kebab.
    Lower,
}

impl CaseStyle {
    /// Parses a style name, falling back to kebab for anything unrecognized.
    /// Unknown values must not raise: configuration files and model output
    /// both feed this.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "snake" => Self::Snake,
            "camel" => Self::Camel,
            "pascal" => Self::Pascal,
            "lower" => Self::Lower,
            _ => Self::Kebab,
        }
    }

    /// Separator placed between the stem and an attached date.
    const fn date_separator(self) -> &'static str {
        match self {
            Self::Kebab | Self::Snake | Self::Lower => "-",
            Self::Camel | Self::Pascal => "",
        }
    }
}

impl From<String> for CaseStyle {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Kebab => "kebab",
            Self::Snake => "snake",
            Self::Camel => "camel",
            Self::Pascal => "pascal",
            Self::Lower => "lower",
        };
        f.write_str(name)
    }
}

/// Output format for generated and extracted dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DateFormat {
    /// `20240115`
    #[default]
    Yyyymmdd,
    /// `2024-01-15`
    YyyyMmDd,
    /// `240115`
    Yymmdd,
    /// `15012024`
    Ddmmyyyy,
}

impl DateFormat {
    /// Parses a format name, falling back to `yyyymmdd` for anything
    /// unrecognized.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "yyyy-mm-dd" => Self::YyyyMmDd,
            "yymmdd" => Self::Yymmdd,
            "ddmmyyyy" => Self::Ddmmyyyy,
            _ => Self::Yyyymmdd,
        }
    }

    /// The chrono strftime pattern for this format.
    const fn strftime(self) -> &'static str {
        match self {
            Self::Yyyymmdd => "%Y%m%d",
            Self::YyyyMmDd => "%Y-%m-%d",
            Self::Yymmdd => "%y%m%d",
            Self::Ddmmyyyy => "%d%m%Y",
        }
    }
}

impl From<String> for DateFormat {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

/// Where the date lands relative to the stem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePosition {
    /// Date appended after the parts.
    #[default]
    End,
    /// Date prepended before the parts.
    Start,
    /// No date in the filename.
    None,
}

/// Formats semantic components into standardized filename stems.
///
/// # Examples
///
/// ```
/// use llm_rename::{FilenameComponents, FilenameFormatter, NamingConfig};
///
/// let formatter = FilenameFormatter::new(&NamingConfig::default());
/// let components = FilenameComponents {
///     brand: Some("nike".to_string()),
///     kind: Some("invoice".to_string()),
///     description: Some("Q1 order".to_string()),
///     ..Default::default()
/// };
///
/// let stem = formatter.format_components(&components, Some("20240115"));
/// assert_eq!(stem, "nike-invoice-q1-order-20240115");
/// ```
#[derive(Debug, Clone)]
pub struct FilenameFormatter {
    case_style: CaseStyle,
    date_format: DateFormat,
    date_position: DatePosition,
    max_length: usize,
}

impl FilenameFormatter {
    /// Creates a formatter from the naming configuration.
    #[must_use]
    pub fn new(naming: &NamingConfig) -> Self {
        Self {
            case_style: naming.case_style,
            date_format: naming.date_format,
            date_position: naming.date_position,
            max_length: naming.max_length,
        }
    }

    /// Builds a filename stem from components and an optional date string.
    ///
    /// Components are taken in priority order (company, brand, project,
    /// subject, type, description), sanitized, and joined according to the
    /// configured case style. Consecutive duplicate parts are collapsed;
    /// non-adjacent repeats are kept. When nothing survives, the stem is the
    /// literal `unnamed-file`. The result is hard-truncated to the maximum
    /// length, which may cut mid-word.
    #[must_use]
    pub fn format_components(
        &self,
        components: &FilenameComponents,
        date: Option<&str>,
    ) -> String {
        let mut parts = Vec::new();
        for (_, value) in components.in_priority_order() {
            let Some(value) = value else { continue };
            if is_null_marker(value) {
                continue;
            }
            let part = sanitize_component(value);
            // Re-check after sanitization: stripping can reduce a value
            // to "null" or to nothing.
            if !part.is_empty() && part != "null" {
                parts.push(part);
            }
        }

        collapse_consecutive_duplicates(&mut parts);

        if parts.is_empty() {
            return FALLBACK_STEM.to_string();
        }

        let mut stem = self.join_parts(&parts);

        if self.date_position != DatePosition::None {
            if let Some(date) = date {
                stem = self.attach_date(&stem, date);
            }
        }

        truncate_chars(&mut stem, self.max_length);
        stem
    }

    /// Joins sanitized parts according to the case style.
    fn join_parts(&self, parts: &[String]) -> String {
        match self.case_style {
            CaseStyle::Kebab | CaseStyle::Lower => parts
                .iter()
                .map(|p| p.replace(' ', "-"))
                .collect::<Vec<_>>()
                .join("-"),
            CaseStyle::Snake => parts
                .iter()
                .map(|p| p.replace(' ', "_"))
                .collect::<Vec<_>>()
                .join("_"),
            CaseStyle::Camel => {
                let mut joined = String::new();
                for (i, part) in parts.iter().enumerate() {
                    if i == 0 {
                        joined.push_str(&part.replace(' ', ""));
                    } else {
                        joined.push_str(&title_case(part).replace(' ', ""));
                    }
                }
                joined
            }
            CaseStyle::Pascal => parts
                .iter()
                .map(|p| title_case(p).replace(' ', ""))
                .collect(),
        }
    }

    /// Attaches a date to the stem at the configured position.
    fn attach_date(&self, stem: &str, date: &str) -> String {
        let separator = self.case_style.date_separator();
        match self.date_position {
            DatePosition::Start => format!("{date}{separator}{stem}"),
            DatePosition::End | DatePosition::None => format!("{stem}{separator}{date}"),
        }
    }

    /// Finds a date already embedded in a filename.
    ///
    /// Candidate patterns in priority order: a run of exactly 8 digits
    /// (validated as a YYYYMMDD calendar date: year 1900-2100, month 1-12,
    /// day 1-31, without month-length or leap-year checks), a `YYYY-MM-DD`
    /// group (normalized to digits only), then a run of exactly 6 digits.
    /// Six-digit runs are accepted without any validation; that asymmetry
    /// is inherited behavior, kept rather than silently fixed.
    #[must_use]
    pub fn extract_date_from_filename(&self, filename: &str) -> Option<String> {
        for run in DIGIT_RUN.find_iter(filename) {
            if run.as_str().len() == 8 && is_plausible_yyyymmdd(run.as_str()) {
                return Some(run.as_str().to_string());
            }
        }

        if let Some(m) = ISO_DATE.find(filename) {
            return Some(m.as_str().replace('-', ""));
        }

        for run in DIGIT_RUN.find_iter(filename) {
            if run.as_str().len() == 6 {
                return Some(run.as_str().to_string());
            }
        }

        None
    }

    /// Returns the current date rendered in the configured format.
    #[must_use]
    pub fn current_date(&self) -> String {
        chrono::Local::now()
            .format(self.date_format.strftime())
            .to_string()
    }

    /// Checks whether a filename already follows the naming convention.
    ///
    /// Only kebab and snake styles are recognized; camel and pascal always
    /// return false, so skipping already-formatted files has no effect under
    /// those styles. Known limitation, kept as-is.
    #[must_use]
    pub fn is_already_formatted(&self, filename: &str) -> bool {
        let Some(stem) = Path::new(filename).file_stem().and_then(|s| s.to_str()) else {
            return false;
        };

        match self.case_style {
            CaseStyle::Kebab => KEBAB_STEM.is_match(stem),
            CaseStyle::Snake => SNAKE_STEM.is_match(stem),
            _ => false,
        }
    }
}

/// Sanitizes one component value: lowercase, strip everything but letters,
/// digits, spaces, and hyphens, collapse runs of whitespace, trim.
fn sanitize_component(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            if pending_space && !cleaned.is_empty() {
                cleaned.push(' ');
            }
            pending_space = false;
            cleaned.push(ch);
        }
    }

    cleaned
}

/// Drops parts equal to their immediate predecessor. Non-adjacent repeats
/// are deliberately preserved: adjacent duplication is model redundancy,
/// distant repeats may be meaningful.
fn collapse_consecutive_duplicates(parts: &mut Vec<String>) {
    parts.dedup();
}

/// Title-cases a part the way Python's `str.title()` does: the first letter
/// after any non-letter boundary is uppercased.
fn title_case(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    let mut boundary = true;

    for ch in part.chars() {
        if ch.is_alphabetic() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(ch);
            boundary = true;
        }
    }

    out
}

/// Hard-truncates a string to at most `max` characters.
fn truncate_chars(text: &mut String, max: usize) {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
}

/// Validates an 8-digit run as a plausible YYYYMMDD date.
fn is_plausible_yyyymmdd(digits: &str) -> bool {
    debug_assert_eq!(digits.len(), 8);
    let Ok(year) = digits[..4].parse::<u32>() else {
        return false;
    };
    let Ok(month) = digits[4..6].parse::<u32>() else {
        return false;
    };
    let Ok(day) = digits[6..8].parse::<u32>() else {
        return false;
    };

    (1900..=2100).contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConfig;

    fn formatter_with(style: CaseStyle) -> FilenameFormatter {
        FilenameFormatter::new(&NamingConfig {
            case_style: style,
            ..NamingConfig::default()
        })
    }

    fn components(pairs: &[(&str, &str)]) -> FilenameComponents {
        let mut c = FilenameComponents::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "company" => c.company = value,
                "brand" => c.brand = value,
                "project" => c.project = value,
                "subject" => c.subject = value,
                "type" => c.kind = value,
                "description" => c.description = value,
                _ => unreachable!("unknown component key"),
            }
        }
        c
    }

    #[test]
    fn test_priority_order_in_output() {
        let formatter = formatter_with(CaseStyle::Kebab);
        let c = components(&[
            ("description", "summary"),
            ("company", "acme"),
            ("type", "report"),
        ]);

        assert_eq!(formatter.format_components(&c, None), "acme-report-summary");
    }

    #[test]
    fn test_end_to_end_kebab_with_date() {
        let formatter = formatter_with(CaseStyle::Kebab);
        let c = components(&[
            ("brand", "nike"),
            ("type", "invoice"),
            ("description", "Q1 order"),
        ]);

        assert_eq!(
            formatter.format_components(&c, Some("20240115")),
            "nike-invoice-q1-order-20240115"
        );
    }

    #[test]
    fn test_null_values_skipped() {
        let formatter = formatter_with(CaseStyle::Kebab);
        let c = components(&[("company", "NULL"), ("brand", "nike"), ("subject", "null")]);

        assert_eq!(formatter.format_components(&c, None), "nike");
    }

    #[test]
    fn test_all_null_falls_back() {
        let formatter = formatter_with(CaseStyle::Pascal);
        let c = components(&[("company", "null"), ("description", "!!!")]);

        assert_eq!(formatter.format_components(&c, Some("20240101")), "unnamed-file");
        assert_eq!(
            formatter.format_components(&FilenameComponents::default(), None),
            "unnamed-file"
        );
    }

    #[test]
    fn test_consecutive_duplicates_collapsed() {
        let mut parts: Vec<String> = ["a", "a", "b", "b", "a"]
            .iter()
            .map(ToString::to_string)
            .collect();
        collapse_consecutive_duplicates(&mut parts);
        assert_eq!(parts, ["a", "b", "a"]);
    }

    #[test]
    fn test_adjacent_model_redundancy() {
        let formatter = formatter_with(CaseStyle::Kebab);
        let c = components(&[("company", "Nike"), ("brand", "nike"), ("type", "invoice")]);

        assert_eq!(formatter.format_components(&c, None), "nike-invoice");
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("Hello,  World!"), "hello world");
        assert_eq!(sanitize_component("Q1-Order (final)"), "q1-order final");
        assert_eq!(sanitize_component("***"), "");
        assert_eq!(sanitize_component("  spaced   out  "), "spaced out");
    }

    #[test]
    fn test_case_styles() {
        let c = components(&[("brand", "acme corp"), ("type", "annual report")]);

        assert_eq!(
            formatter_with(CaseStyle::Kebab).format_components(&c, None),
            "acme-corp-annual-report"
        );
        assert_eq!(
            formatter_with(CaseStyle::Snake).format_components(&c, None),
            "acme_corp_annual_report"
        );
        assert_eq!(
            formatter_with(CaseStyle::Camel).format_components(&c, None),
            "acmecorpAnnualReport"
        );
        assert_eq!(
            formatter_with(CaseStyle::Pascal).format_components(&c, None),
            "AcmeCorpAnnualReport"
        );
        assert_eq!(
            formatter_with(CaseStyle::Lower).format_components(&c, None),
            "acme-corp-annual-report"
        );
    }

    #[test]
    fn test_unknown_style_falls_back_to_kebab() {
        assert_eq!(CaseStyle::from_name("screaming"), CaseStyle::Kebab);
        assert_eq!(CaseStyle::from_name(""), CaseStyle::Kebab);
        assert_eq!(CaseStyle::from_name("SNAKE"), CaseStyle::Snake);
    }

    #[test]
    fn test_date_position_start() {
        let formatter = FilenameFormatter::new(&NamingConfig {
            date_position: DatePosition::Start,
            ..NamingConfig::default()
        });
        let c = components(&[("subject", "minutes")]);

        assert_eq!(
            formatter.format_components(&c, Some("20240301")),
            "20240301-minutes"
        );
    }

    #[test]
    fn test_date_position_none_ignores_date() {
        let formatter = FilenameFormatter::new(&NamingConfig {
            date_position: DatePosition::None,
            ..NamingConfig::default()
        });
        let c = components(&[("subject", "minutes")]);

        assert_eq!(formatter.format_components(&c, Some("20240301")), "minutes");
    }

    #[test]
    fn test_date_no_separator_for_pascal() {
        let formatter = FilenameFormatter::new(&NamingConfig {
            case_style: CaseStyle::Pascal,
            ..NamingConfig::default()
        });
        let c = components(&[("subject", "minutes")]);

        assert_eq!(
            formatter.format_components(&c, Some("20240301")),
            "Minutes20240301"
        );
    }

    #[test]
    fn test_truncation_bound() {
        let formatter = FilenameFormatter::new(&NamingConfig {
            max_length: 10,
            ..NamingConfig::default()
        });
        let c = components(&[("description", "a very long description of the contents")]);

        let stem = formatter.format_components(&c, Some("20240101"));
        assert_eq!(stem.chars().count(), 10);
        assert_eq!(stem, "a-very-lon");
    }

    #[test]
    fn test_extract_eight_digit_date() {
        let formatter = formatter_with(CaseStyle::Kebab);
        assert_eq!(
            formatter.extract_date_from_filename("invoice-20240315-final.pdf"),
            Some("20240315".to_string())
        );
    }

    #[test]
    fn test_extract_iso_date_normalized() {
        let formatter = formatter_with(CaseStyle::Kebab);
        assert_eq!(
            formatter.extract_date_from_filename("minutes 2024-03-15.docx"),
            Some("20240315".to_string())
        );
    }

    #[test]
    fn test_extract_six_digit_unvalidated() {
        // Six-digit runs skip calendar validation entirely.
        let formatter = formatter_with(CaseStyle::Kebab);
        assert_eq!(
            formatter.extract_date_from_filename("report_991599.pdf"),
            Some("991599".to_string())
        );
    }

    #[test]
    fn test_extract_rejects_implausible_eight_digits() {
        // Month 99 fails calendar validation and the run is too long to
        // qualify as a six-digit candidate, so nothing matches.
        let formatter = formatter_with(CaseStyle::Kebab);
        assert_eq!(formatter.extract_date_from_filename("doc_99999999.pdf"), None);
    }

    #[test]
    fn test_extract_no_date() {
        let formatter = formatter_with(CaseStyle::Kebab);
        assert_eq!(formatter.extract_date_from_filename("report_13-2024.pdf"), None);
        assert_eq!(formatter.extract_date_from_filename("notes.txt"), None);
    }

    #[test]
    fn test_current_date_formats() {
        let naming = NamingConfig {
            date_format: DateFormat::YyyyMmDd,
            ..NamingConfig::default()
        };
        let date = FilenameFormatter::new(&naming).current_date();
        assert_eq!(date.len(), 10);
        assert_eq!(date.matches('-').count(), 2);

        let date = formatter_with(CaseStyle::Kebab).current_date();
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_is_already_formatted_kebab() {
        let formatter = formatter_with(CaseStyle::Kebab);
        assert!(formatter.is_already_formatted("annual-report-20240115.pdf"));
        assert!(formatter.is_already_formatted("notes.txt"));
        assert!(!formatter.is_already_formatted("Annual Report.pdf"));
        assert!(!formatter.is_already_formatted("annual_report.pdf"));
    }

    #[test]
    fn test_is_already_formatted_snake() {
        let formatter = formatter_with(CaseStyle::Snake);
        assert!(formatter.is_already_formatted("annual_report.pdf"));
        assert!(!formatter.is_already_formatted("annual-report.pdf"));
    }

    #[test]
    fn test_is_already_formatted_never_true_for_concatenated_styles() {
        assert!(!formatter_with(CaseStyle::Camel).is_already_formatted("annualreport.pdf"));
        assert!(!formatter_with(CaseStyle::Pascal).is_already_formatted("AnnualReport.pdf"));
    }

    #[test]
    fn test_format_round_trips_for_kebab_and_snake() {
        for style in [CaseStyle::Kebab, CaseStyle::Snake] {
            let formatter = formatter_with(style);
            let c = components(&[
                ("company", "Acme Corp"),
                ("type", "Invoice"),
                ("description", "Q1 order"),
            ]);

            let stem = formatter.format_components(&c, Some("20240115"));
            assert!(
                formatter.is_already_formatted(&format!("{stem}.pdf")),
                "{style} output '{stem}' should satisfy its own convention"
            );
        }
    }
}
