use std::path::Path;

use tracing::{debug, instrument, warn};

/// Bundled copy of the location-to-grid reference table published with the
/// KMA nowcast API documentation. First line is the column header.
static BUNDLED_TABLE: &str = include_str!("../resources/grid_points.csv");

/// Fallback grid point for locations absent from the table (Seoul city hall).
pub const DEFAULT_GRID_POINT: GridPoint = GridPoint { x: 60, y: 127 };

const COMMA_DELIMITER: char = ',';
const MIN_FIELDS: usize = 7;

/// A cell on the KMA forecast grid. Distinct from geographic
/// latitude/longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPoint {
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Clone)]
struct GridRecord {
    province: String,
    district: String,
    neighborhood: String,
    point: GridPoint,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read grid table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Grid table line {line}: expected at least 7 comma-separated fields, found {found}")]
    MissingFields { line: usize, found: usize },
    #[error("Grid table line {line}: invalid grid coordinate '{value}'")]
    InvalidCoordinate { line: usize, value: String },
}

/// The static location-to-grid reference table. Loaded once at startup and
/// shared read-only; lookups never mutate it.
#[derive(Debug, Clone)]
pub struct GridTable {
    records: Vec<GridRecord>,
}

impl GridTable {
    /// Parse the table bundled into the binary.
    pub fn bundled() -> Result<Self, LoadError> {
        Self::parse(BUNDLED_TABLE)
    }

    /// Load a table from a CSV file on disk.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, LoadError> {
        let mut records = Vec::new();

        // Skip the header line; report malformed rows by 1-based line number.
        for (idx, line) in content.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(COMMA_DELIMITER).collect();
            if fields.len() < MIN_FIELDS {
                return Err(LoadError::MissingFields {
                    line: idx + 1,
                    found: fields.len(),
                });
            }

            let x = parse_coordinate(fields[5], idx + 1)?;
            let y = parse_coordinate(fields[6], idx + 1)?;

            records.push(GridRecord {
                province: fields[2].to_string(),
                district: fields[3].to_string(),
                neighborhood: fields[4].to_string(),
                point: GridPoint { x, y },
            });
        }

        debug!("Parsed {} grid records", records.len());
        Ok(Self { records })
    }

    /// Resolve an administrative triple to its grid point.
    ///
    /// Matching is exact, in table order; if the source data carried a
    /// duplicate key the earliest row wins. Absent district/neighborhood
    /// levels are represented as empty strings. Locations not present in
    /// the table resolve to [`DEFAULT_GRID_POINT`].
    pub fn lookup(&self, province: &str, district: &str, neighborhood: &str) -> GridPoint {
        for record in &self.records {
            if record.province == province
                && record.district == district
                && record.neighborhood == neighborhood
            {
                debug!(
                    "Grid point for {} {} {}: ({}, {})",
                    province, district, neighborhood, record.point.x, record.point.y
                );
                return record.point;
            }
        }

        warn!(
            "No grid record for {} {} {}, falling back to default",
            province, district, neighborhood
        );
        DEFAULT_GRID_POINT
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_coordinate(value: &str, line: usize) -> Result<u16, LoadError> {
    value.trim().parse::<u16>().map_err(|_| LoadError::InvalidCoordinate {
        line,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
구분,행정구역코드,1단계,2단계,3단계,격자 X,격자 Y,경도(초/100),위도(초/100)
kor,1100000000,서울특별시,,,60,127,126.98,37.56
kor,1111051500,서울특별시,종로구,청운효자동,60,127,126.97,37.58
kor,2611058000,부산광역시,중구,중앙동,97,74,129.03,35.10
";

    #[test]
    fn test_lookup_full_triple() {
        let table = GridTable::parse(SAMPLE).unwrap();
        let point = table.lookup("부산광역시", "중구", "중앙동");
        assert_eq!(point, GridPoint { x: 97, y: 74 });
    }

    #[test]
    fn test_lookup_province_only_matches_empty_columns() {
        let table = GridTable::parse(SAMPLE).unwrap();
        let point = table.lookup("서울특별시", "", "");
        assert_eq!(point, GridPoint { x: 60, y: 127 });
    }

    #[test]
    fn test_lookup_absent_triple_uses_default() {
        let table = GridTable::parse(SAMPLE).unwrap();
        let point = table.lookup("서울특별시", "없는구", "없는동");
        assert_eq!(point, DEFAULT_GRID_POINT);
    }

    #[test]
    fn test_lookup_partial_match_is_not_a_match() {
        // District must match exactly, not as a prefix of a fuller row.
        let table = GridTable::parse(SAMPLE).unwrap();
        let point = table.lookup("부산광역시", "중구", "");
        assert_eq!(point, DEFAULT_GRID_POINT);
    }

    #[test]
    fn test_header_line_is_not_data() {
        let table = GridTable::parse(SAMPLE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("1단계", "2단계", "3단계"), DEFAULT_GRID_POINT);
    }

    #[test]
    fn test_duplicate_key_first_row_wins() {
        let content = "\
header
kor,1,가도,가구,가동,10,20,0,0
kor,2,가도,가구,가동,30,40,0,0
";
        let table = GridTable::parse(content).unwrap();
        assert_eq!(table.lookup("가도", "가구", "가동"), GridPoint { x: 10, y: 20 });
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let content = "header\nkor,1,가도,가구,가동,10\n";
        let err = GridTable::parse(content).unwrap_err();
        match err {
            LoadError::MissingFields { line, found } => {
                assert_eq!(line, 2);
                assert_eq!(found, 6);
            }
            e => panic!("Expected MissingFields error, got: {e:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_integer_coordinate() {
        let content = "header\nkor,1,가도,가구,가동,abc,20,0,0\n";
        let err = GridTable::parse(content).unwrap_err();
        match err {
            LoadError::InvalidCoordinate { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "abc");
            }
            e => panic!("Expected InvalidCoordinate error, got: {e:?}"),
        }
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let content = "header\n\nkor,1,가도,,,10,20,0,0\n\n";
        let table = GridTable::parse(content).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = GridTable::load(Path::new("/nonexistent/grid_points.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_bundled_table_has_cheongunhyoja_dong() {
        let table = GridTable::bundled().unwrap();
        assert!(!table.is_empty());
        let point = table.lookup("서울특별시", "종로구", "청운효자동");
        assert_eq!(point, GridPoint { x: 60, y: 127 });
    }

    #[test]
    fn test_bundled_table_busan_differs_from_default() {
        let table = GridTable::bundled().unwrap();
        let point = table.lookup("부산광역시", "", "");
        assert_eq!(point, GridPoint { x: 98, y: 76 });
        assert_ne!(point, DEFAULT_GRID_POINT);
    }
}
