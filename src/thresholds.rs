//! Region-specific BMI threshold tables.
//!
//! Every band is half-open `[low, high)` except the terminal band, which is
//! `[low, +inf)`. Lookup scans bands in ascending order and returns the first
//! match, so any finite non-negative BMI maps to exactly one category.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Region, Severity};
use crate::error::{ClassifyError, ParseError, TableError};

/// A single BMI band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    /// Exclusive upper bound; `None` for the open-ended terminal band.
    pub high: Option<f64>,
    pub category: Category,
    pub severity: Severity,
}

impl Band {
    const fn new(low: f64, high: Option<f64>, category: Category, severity: Severity) -> Self {
        Self {
            low,
            high,
            category,
            severity,
        }
    }

    /// Returns true if the BMI falls inside this band.
    pub fn contains(&self, bmi: f64) -> bool {
        bmi >= self.low && self.high.is_none_or(|high| bmi < high)
    }
}

/// Ordered list of bands for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    bands: Vec<Band>,
}

/// Builds a four-band table from the three cut points between categories.
fn standard_table(normal_from: f64, overweight_from: f64, obese_from: f64) -> ThresholdTable {
    ThresholdTable {
        bands: vec![
            Band::new(0.0, Some(normal_from), Category::Underweight, Severity::Caution),
            Band::new(normal_from, Some(overweight_from), Category::Normal, Severity::Healthy),
            Band::new(overweight_from, Some(obese_from), Category::Overweight, Severity::Caution),
            Band::new(obese_from, None, Category::Obese, Severity::Alert),
        ],
    }
}

impl ThresholdTable {
    /// Creates a table after checking that the bands cover [0, +inf) without
    /// gaps or overlaps and contain exactly one Normal band.
    pub fn new(bands: Vec<Band>) -> Result<Self, TableError> {
        let first = bands.first().ok_or(TableError::Empty)?;
        if first.low != 0.0 {
            return Err(TableError::NonZeroStart(first.low));
        }

        for (i, band) in bands.iter().enumerate() {
            if !band.low.is_finite() {
                return Err(TableError::NonFiniteLow(i));
            }
            if band.category == Category::Unknown {
                return Err(TableError::ReservedCategory(i));
            }

            let is_last = i + 1 == bands.len();
            match (band.high, is_last) {
                (None, true) => {}
                (None, false) => return Err(TableError::OpenEndedBeforeLast(i)),
                (Some(_), true) => return Err(TableError::ClosedTerminalBand),
                (Some(high), false) => {
                    if !(high.is_finite() && high > band.low) {
                        return Err(TableError::EmptyBand {
                            index: i,
                            low: band.low,
                            high,
                        });
                    }
                    let next_low = bands[i + 1].low;
                    if next_low != high {
                        return Err(TableError::Discontinuous {
                            index: i,
                            high,
                            next_low,
                        });
                    }
                }
            }
        }

        let normal_count = bands
            .iter()
            .filter(|b| b.category == Category::Normal)
            .count();
        if normal_count != 1 {
            return Err(TableError::NormalBandCount(normal_count));
        }

        Ok(Self { bands })
    }

    /// Returns the bands in ascending order.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Returns the first band containing the BMI, if any.
    pub fn find(&self, bmi: f64) -> Option<&Band> {
        self.bands.iter().find(|band| band.contains(bmi))
    }

    /// Classifies a BMI into a category and severity.
    ///
    /// Falls back to `Unknown` only if no band matches, which an open-ended
    /// terminal band rules out for every finite non-negative BMI.
    pub fn classify(&self, bmi: f64) -> (Category, Severity) {
        match self.find(bmi) {
            Some(band) => (band.category, band.severity),
            None => {
                log::error!("no BMI band matched {}; threshold table is incomplete", bmi);
                (Category::Unknown, Severity::Alert)
            }
        }
    }

    /// Returns the healthy BMI range as `(low, high)`.
    pub fn normal_range(&self) -> (f64, f64) {
        self.bands
            .iter()
            .find(|b| b.category == Category::Normal)
            .map(|b| (b.low, b.high.unwrap_or(b.low)))
            // Tables are validated on construction to hold one Normal band.
            .unwrap_or((0.0, 0.0))
    }
}

/// Registry mapping each region to its threshold table.
#[derive(Debug, Clone)]
pub struct RegionTables {
    tables: HashMap<Region, ThresholdTable>,
}

impl Default for RegionTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl RegionTables {
    /// Creates a registry with no tables.
    pub fn empty() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Returns the built-in profiles.
    ///
    /// The Pacific Islander profile uses Underweight below 18.5; Custom starts
    /// out identical to General.
    pub fn standard() -> Self {
        let general = standard_table(18.5, 25.0, 30.0);
        let mut tables = HashMap::new();
        tables.insert(Region::Asian, standard_table(18.5, 23.0, 27.5));
        tables.insert(Region::PacificIslander, standard_table(18.5, 27.0, 32.0));
        tables.insert(Region::Custom, general.clone());
        tables.insert(Region::General, general);
        Self { tables }
    }

    /// Replaces the table for a region.
    pub fn with_table(mut self, region: Region, table: ThresholdTable) -> Self {
        self.tables.insert(region, table);
        self
    }

    /// Returns the table for a region.
    pub fn get(&self, region: Region) -> Result<&ThresholdTable, ClassifyError> {
        self.tables
            .get(&region)
            .ok_or(ClassifyError::UnknownRegion(region))
    }

    /// Returns registered tables in `Region::all()` order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, &ThresholdTable)> {
        Region::all()
            .iter()
            .filter_map(|r| self.tables.get(r).map(|t| (*r, t)))
    }

    /// Loads table overrides from a JSON file on top of the standard profiles.
    ///
    /// The file is an object keyed by region, each value a list of bands:
    /// ```text
    /// { "custom": [ { "low": 0, "high": 20, "category": "Underweight", "severity": "caution" }, ... ] }
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ParseError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ParseError::CannotRead(format!("{}: {}", path.display(), e)))?;

        let tables = Self::standard().with_overrides(&contents)?;
        log::info!("Loaded threshold tables from {}", path.display());
        Ok(tables)
    }

    /// Applies overrides given as JSON text.
    pub fn with_overrides(mut self, json: &str) -> Result<Self, ParseError> {
        let raw: HashMap<String, Vec<Band>> =
            serde_json::from_str(json).map_err(|e| ParseError::InvalidFormat(e.to_string()))?;

        for (key, bands) in raw {
            let region = Region::from_str(&key)?;
            let table = ThresholdTable::new(bands).map_err(|reason| ParseError::InvalidTable {
                region: region.key().to_string(),
                reason,
            })?;
            log::debug!("Overriding {} table ({} bands)", region, table.bands().len());
            self.tables.insert(region, table);
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general() -> ThresholdTable {
        RegionTables::standard()
            .get(Region::General)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_general_boundaries() {
        let table = general();
        assert_eq!(table.classify(18.4).0, Category::Underweight);
        assert_eq!(table.classify(18.5).0, Category::Normal);
        assert_eq!(table.classify(24.9).0, Category::Normal);
        assert_eq!(table.classify(24.99).0, Category::Normal);
        assert_eq!(table.classify(25.0).0, Category::Overweight);
        assert_eq!(table.classify(29.9).0, Category::Overweight);
        assert_eq!(table.classify(30.0).0, Category::Obese);
        assert_eq!(table.classify(75.0).0, Category::Obese);
    }

    #[test]
    fn test_asian_boundaries() {
        let tables = RegionTables::standard();
        let table = tables.get(Region::Asian).unwrap();
        assert_eq!(table.classify(22.9).0, Category::Normal);
        assert_eq!(table.classify(23.0).0, Category::Overweight);
        assert_eq!(table.classify(27.4).0, Category::Overweight);
        assert_eq!(table.classify(27.5).0, Category::Obese);
    }

    #[test]
    fn test_pacific_islander_boundaries() {
        let tables = RegionTables::standard();
        let table = tables.get(Region::PacificIslander).unwrap();
        assert_eq!(table.classify(18.4).0, Category::Underweight);
        assert_eq!(table.classify(25.0).0, Category::Normal);
        assert_eq!(table.classify(26.9).0, Category::Normal);
        assert_eq!(table.classify(27.0).0, Category::Overweight);
        assert_eq!(table.classify(32.0).0, Category::Obese);
    }

    #[test]
    fn test_custom_defaults_to_general() {
        let tables = RegionTables::standard();
        assert_eq!(
            tables.get(Region::Custom).unwrap(),
            tables.get(Region::General).unwrap()
        );
    }

    #[test]
    fn test_severity_tags() {
        let table = general();
        assert_eq!(table.classify(17.0).1, Severity::Caution);
        assert_eq!(table.classify(22.0).1, Severity::Healthy);
        assert_eq!(table.classify(27.0).1, Severity::Caution);
        assert_eq!(table.classify(35.0).1, Severity::Alert);
    }

    #[test]
    fn test_classification_is_total() {
        let tables = RegionTables::standard();
        for (region, table) in tables.iter() {
            for i in 0..=8000 {
                let bmi = i as f64 * 0.01;
                let matches = table.bands().iter().filter(|b| b.contains(bmi)).count();
                assert_eq!(matches, 1, "{} BMI {} matched {} bands", region, bmi, matches);
                assert_ne!(table.classify(bmi).0, Category::Unknown);
            }
        }
    }

    #[test]
    fn test_unmatched_bmi_is_unknown() {
        let table = general();
        assert_eq!(table.classify(-1.0).0, Category::Unknown);
        assert_eq!(table.classify(f64::NAN).0, Category::Unknown);
    }

    #[test]
    fn test_normal_range() {
        let tables = RegionTables::standard();
        assert_eq!(tables.get(Region::General).unwrap().normal_range(), (18.5, 25.0));
        assert_eq!(tables.get(Region::Asian).unwrap().normal_range(), (18.5, 23.0));
    }

    #[test]
    fn test_unknown_region_in_empty_registry() {
        let tables = RegionTables::empty();
        assert_eq!(
            tables.get(Region::Asian).unwrap_err(),
            ClassifyError::UnknownRegion(Region::Asian)
        );
    }

    #[test]
    fn test_table_rejects_gap() {
        let bands = vec![
            Band::new(0.0, Some(18.5), Category::Underweight, Severity::Caution),
            Band::new(19.0, None, Category::Normal, Severity::Healthy),
        ];
        assert_eq!(
            ThresholdTable::new(bands),
            Err(TableError::Discontinuous {
                index: 0,
                high: 18.5,
                next_low: 19.0,
            })
        );
    }

    #[test]
    fn test_table_rejects_closed_terminal_band() {
        let bands = vec![
            Band::new(0.0, Some(18.5), Category::Underweight, Severity::Caution),
            Band::new(18.5, Some(40.0), Category::Normal, Severity::Healthy),
        ];
        assert_eq!(
            ThresholdTable::new(bands),
            Err(TableError::ClosedTerminalBand)
        );
    }

    #[test]
    fn test_table_rejects_missing_normal() {
        let bands = vec![
            Band::new(0.0, Some(18.5), Category::Underweight, Severity::Caution),
            Band::new(18.5, None, Category::Obese, Severity::Alert),
        ];
        assert_eq!(
            ThresholdTable::new(bands),
            Err(TableError::NormalBandCount(0))
        );
    }

    #[test]
    fn test_table_rejects_nonzero_start() {
        let bands = vec![Band::new(10.0, None, Category::Normal, Severity::Healthy)];
        assert_eq!(
            ThresholdTable::new(bands),
            Err(TableError::NonZeroStart(10.0))
        );
        assert_eq!(ThresholdTable::new(Vec::new()), Err(TableError::Empty));
    }

    #[test]
    fn test_overrides_replace_custom_only() {
        let json = r#"{
            "custom": [
                { "low": 0, "high": 20, "category": "Underweight", "severity": "caution" },
                { "low": 20, "high": 26, "category": "Normal", "severity": "healthy" },
                { "low": 26, "high": null, "category": "Obese", "severity": "alert" }
            ]
        }"#;

        let tables = RegionTables::standard().with_overrides(json).unwrap();
        let custom = tables.get(Region::Custom).unwrap();
        assert_eq!(custom.bands().len(), 3);
        assert_eq!(custom.classify(19.0).0, Category::Underweight);
        assert_eq!(custom.normal_range(), (20.0, 26.0));
        assert_eq!(tables.get(Region::General).unwrap(), &general());
    }

    #[test]
    fn test_overrides_reject_unknown_region() {
        let err = RegionTables::standard()
            .with_overrides(r#"{ "martian": [] }"#)
            .unwrap_err();
        assert!(matches!(err, ParseError::UnknownRegion(_)));
    }

    #[test]
    fn test_overrides_reject_invalid_table() {
        let json = r#"{ "asian": [ { "low": 0, "high": 18.5, "category": "Normal", "severity": "healthy" } ] }"#;
        let err = RegionTables::standard().with_overrides(json).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidTable {
                ref region,
                reason: TableError::ClosedTerminalBand,
            } if region == "asian"
        ));
    }

    #[test]
    fn test_overrides_reject_malformed_json() {
        let err = RegionTables::standard().with_overrides("not json").unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RegionTables::load("/nonexistent/tables.json").unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound(_)));
    }
}
