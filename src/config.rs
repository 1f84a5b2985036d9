use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV: &str = "DEBT_COMPS_CONFIG";
/// Environment variable overriding `source.url`.
pub const URL_ENV: &str = "DEBT_COMPS_URL";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

/// A pair of quantile cut-offs, both expressed as fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileBand {
    pub lower: f64,
    pub upper: f64,
}

impl QuantileBand {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        validate_quantile(self.lower, name)?;
        validate_quantile(self.upper, name)?;
        if self.lower > self.upper {
            return Err(ConfigError::Invalid(format!(
                "{name}: lower quantile {} is above upper {}",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// Where the comps workbook lives and which region of it holds the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Workbook URL. Empty means "no remote source": the app starts blank and
    /// the user opens a local file.
    pub url: String,
    pub sheet: String,
    /// Rows skipped before the header row.
    pub skip_rows: u32,
    /// Inclusive column-letter span, e.g. `G:X`.
    pub columns: String,
    /// Maximum number of data rows read below the header.
    pub max_rows: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            sheet: "Loans".to_string(),
            skip_rows: 3,
            columns: "G:X".to_string(),
            max_rows: 261,
        }
    }
}

impl SourceConfig {
    /// Zero-based inclusive column indices of `columns`.
    pub fn column_span(&self) -> Result<(u32, u32), ConfigError> {
        parse_column_span(&self.columns)
    }
}

/// Quantile bands computed over the full loaded set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// Rows with DM outside this band are dropped before filtering.
    pub dm: QuantileBand,
    /// Default YTM slider position.
    pub ytm_default: QuantileBand,
    /// Default Ask slider position.
    pub ask_default: QuantileBand,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            dm: QuantileBand::new(0.10, 0.95),
            ytm_default: QuantileBand::new(0.10, 0.95),
            ask_default: QuantileBand::new(0.135, 0.99),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Upper DM quantile (over the trimmed set) bounding the DM chart view.
    pub dm_chart_upper: f64,
    /// Upper YTM quantile (over the trimmed set) where the Price x YTM
    /// horizontal guide ends.
    pub ytm_guide_upper: f64,
    /// Price at which the vertical guides start.
    pub price_floor: f64,
    pub bar_color: String,
    pub guide_color: String,
    pub window_title: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            dm_chart_upper: 0.90,
            ytm_guide_upper: 0.925,
            price_floor: 80.0,
            bar_color: "#0083B8".to_string(),
            guide_color: "#FF0000".to_string(),
            window_title: "Debt Comps".to_string(),
        }
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    pub trim: TrimConfig,
    pub charts: ChartConfig,
}

impl DashboardConfig {
    /// Defaults, overlaid with the file named by `DEBT_COMPS_CONFIG` and the
    /// `DEBT_COMPS_URL` override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(URL_ENV) {
            config.source.url = url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.column_span()?;
        if self.source.sheet.trim().is_empty() {
            return Err(ConfigError::Invalid("source.sheet is empty".into()));
        }
        self.trim.dm.validate("trim.dm")?;
        self.trim.ytm_default.validate("trim.ytm_default")?;
        self.trim.ask_default.validate("trim.ask_default")?;
        validate_quantile(self.charts.dm_chart_upper, "charts.dm_chart_upper")?;
        validate_quantile(self.charts.ytm_guide_upper, "charts.ytm_guide_upper")?;
        if !self.charts.price_floor.is_finite() {
            return Err(ConfigError::Invalid("charts.price_floor is not finite".into()));
        }
        for (name, hex) in [
            ("charts.bar_color", &self.charts.bar_color),
            ("charts.guide_color", &self.charts.guide_color),
        ] {
            crate::color::parse_hex(hex)
                .map_err(|e| ConfigError::Invalid(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}

fn validate_quantile(q: f64, name: &str) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&q) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name}: quantile {q} outside [0, 1]")))
    }
}

// ---------------------------------------------------------------------------
// Column letters
// ---------------------------------------------------------------------------

/// `A` → 0, `Z` → 25, `AA` → 26.
pub fn column_index(letters: &str) -> Option<u32> {
    let letters = letters.trim();
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
    .map(|n| n - 1)
}

/// Parse `G:X` into zero-based inclusive `(first, last)` indices.
pub fn parse_column_span(span: &str) -> Result<(u32, u32), ConfigError> {
    let invalid = || ConfigError::Invalid(format!("bad column span '{span}'"));
    let (first, last) = span.split_once(':').ok_or_else(invalid)?;
    let first = column_index(first).ok_or_else(invalid)?;
    let last = column_index(last).ok_or_else(invalid)?;
    if first > last {
        return Err(invalid());
    }
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sheet_layout() {
        let config = DashboardConfig::default();
        assert_eq!(config.source.sheet, "Loans");
        assert_eq!(config.source.skip_rows, 3);
        assert_eq!(config.source.max_rows, 261);
        assert_eq!(config.source.column_span().unwrap(), (6, 23));
        assert_eq!(config.trim.ask_default, QuantileBand::new(0.135, 0.99));
        config.validate().unwrap();
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("g"), Some(6));
        assert_eq!(column_index("X"), Some(23));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("G1"), None);
        assert!(parse_column_span("X:G").is_err());
        assert!(parse_column_span("G").is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            [source]
            url = "https://example.com/comps.xlsx"
            max_rows = 100

            [trim.dm]
            lower = 0.05
            upper = 0.99
            "#,
        )
        .unwrap();
        assert_eq!(config.source.url, "https://example.com/comps.xlsx");
        assert_eq!(config.source.max_rows, 100);
        assert_eq!(config.source.sheet, "Loans");
        assert_eq!(config.trim.dm, QuantileBand::new(0.05, 0.99));
        assert_eq!(config.trim.ytm_default, QuantileBand::new(0.10, 0.95));
        assert_eq!(config.charts.price_floor, 80.0);
    }

    #[test]
    fn rejects_inverted_band() {
        let err = DashboardConfig::from_toml_str(
            r#"
            [trim.ask_default]
            lower = 0.9
            upper = 0.1
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_colour_and_span() {
        assert!(DashboardConfig::from_toml_str("[charts]\nbar_color = \"blue-ish\"").is_err());
        assert!(DashboardConfig::from_toml_str("[source]\ncolumns = \"7:9\"").is_err());
    }
}
