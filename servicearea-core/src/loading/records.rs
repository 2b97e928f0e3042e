//! Tabular input records (CSV) and the query points read from them

use std::fs::File;
use std::io::Read;
use std::path::Path;

use geo::Point;

use crate::Error;

/// Location of a single input record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryPoint {
    /// Row index of the record in its table
    pub record: usize,
    /// (longitude, latitude) as (x, y)
    pub geometry: Point<f64>,
}

impl QueryPoint {
    pub fn new(record: usize, longitude: f64, latitude: f64) -> Self {
        Self {
            record,
            geometry: Point::new(longitude, latitude),
        }
    }
}

/// Table of string cells with named columns, typically read from CSV
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// # Errors
    ///
    /// Every row must have one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, Error> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != headers.len())
        {
            return Err(Error::InvalidData(format!(
                "Row {row} has {} cells, expected {}",
                cells.len(),
                headers.len()
            )));
        }
        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to open file '{}': {}", path.display(), e),
            )
        })?;
        Self::from_reader(file)
    }

    /// Reads CSV with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;

        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let column = self.column(column)?;
        self.rows.get(row).map(|cells| cells[column].as_str())
    }

    /// Coordinates of every record, in row order.
    ///
    /// # Errors
    ///
    /// Fails if a column is missing or a cell is not a finite number.
    pub fn query_points(
        &self,
        longitude_field: &str,
        latitude_field: &str,
    ) -> Result<Vec<QueryPoint>, Error> {
        let lon_column = self
            .column(longitude_field)
            .ok_or_else(|| Error::MissingColumn(longitude_field.to_string()))?;
        let lat_column = self
            .column(latitude_field)
            .ok_or_else(|| Error::MissingColumn(latitude_field.to_string()))?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let longitude = parse_coordinate(row, longitude_field, &cells[lon_column])?;
                let latitude = parse_coordinate(row, latitude_field, &cells[lat_column])?;
                Ok(QueryPoint::new(row, longitude, latitude))
            })
            .collect()
    }
}

fn parse_coordinate(row: usize, field: &str, cell: &str) -> Result<f64, Error> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            Error::InvalidData(format!(
                "Row {row}: value '{cell}' in column '{field}' is not a valid coordinate"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv() {
        let csv = "stop_id,lon, lat\nA,103.85,1.29\nB, 103.86 ,1.30\n";
        let table = RecordTable::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.headers(), ["stop_id", "lon", "lat"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "stop_id"), Some("B"));

        let points = table.query_points("lon", "lat").unwrap();
        assert_eq!(
            points,
            vec![
                QueryPoint::new(0, 103.85, 1.29),
                QueryPoint::new(1, 103.86, 1.30)
            ]
        );
    }

    #[test]
    fn test_bad_coordinate() {
        let csv = "lon,lat\n1.0,2.0\nabc,2.0\n";
        let table = RecordTable::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            table.query_points("lon", "lat"),
            Err(Error::InvalidData(_))
        ));

        let csv = "lon,lat\ninf,2.0\n";
        let table = RecordTable::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            table.query_points("lon", "lat"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_missing_column() {
        let table = RecordTable::from_reader("x,y\n1,2\n".as_bytes()).unwrap();
        assert!(matches!(
            table.query_points("x", "lat"),
            Err(Error::MissingColumn(column)) if column == "lat"
        ));
    }

    #[test]
    fn test_ragged_rows() {
        assert!(RecordTable::from_reader("x,y\n1,2,3\n".as_bytes()).is_err());
        assert!(matches!(
            RecordTable::new(vec!["x".to_string()], vec![vec![]]),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = RecordTable::from_reader("lon,lat\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert!(table.query_points("lon", "lat").unwrap().is_empty());
    }
}
