use std::io;
use std::path::Path;

use tracing::debug;

use super::TrafficSegment;
use crate::error::IngestError;

const EDGE_ID_COLUMN: usize = 0;
const WEEKDAY_TRAFFIC_COLUMN: usize = 1;
const GEOMETRY_COLUMN: usize = 5;

/// Reads a road traffic export. See [`parse_traffic_csv`] for the format.
pub fn load_traffic_csv(
    path: impl AsRef<Path>,
) -> Result<Vec<TrafficSegment>, IngestError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let segments = parse_traffic_csv(file)?;
    debug!(path = %path.display(), segments = segments.len(), "traffic csv loaded");
    Ok(segments)
}

/// Parses comma separated traffic rows after a header line.
///
/// Column 0 is the edge id, exported in scientific notation (`1.91E+16`) and
/// truncated to an integer; rows where it does not parse are skipped.
/// Column 1 is the weekday traffic count, `0` when unparseable. Column 5 is
/// the segment geometry as WKT. Rows with fewer than six columns are skipped.
/// Other columns are never decoded, so they may hold any encoding.
pub fn parse_traffic_csv<R: io::Read>(
    reader: R,
) -> Result<Vec<TrafficSegment>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut segments = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let Some(geometry) = text_field(&record, GEOMETRY_COLUMN) else {
            continue;
        };
        let Some(edge_id) = text_field(&record, EDGE_ID_COLUMN)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|id| id.is_finite())
        else {
            continue;
        };
        let weekday_traffic = text_field(&record, WEEKDAY_TRAFFIC_COLUMN)
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .unwrap_or(0);

        segments.push(TrafficSegment {
            edge_id: edge_id as i64,
            weekday_traffic,
            geometry: geometry.to_string(),
        });
    }
    Ok(segments)
}

fn text_field(record: &csv::ByteRecord, column: usize) -> Option<&str> {
    record
        .get(column)
        .and_then(|raw| std::str::from_utf8(raw).ok())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str =
        "edge_id,weekday_traffic,weekend_traffic,speed,lanes,geometry\n";

    #[test]
    fn scientific_edge_ids_are_truncated() {
        let csv = format!(
            "{HEADER}1.91E+16,1200,800,40,2,\"LINESTRING(71.4 51.1, 71.5 51.2)\"\n"
        );
        let segments = parse_traffic_csv(csv.as_bytes()).expect("parse");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].edge_id, 19_100_000_000_000_000);
        assert_eq!(segments[0].weekday_traffic, 1200);
        assert_eq!(segments[0].geometry, "LINESTRING(71.4 51.1, 71.5 51.2)");
    }

    #[test]
    fn bad_edge_ids_skip_the_row() {
        let csv = format!(
            "{HEADER}abc,10,0,0,0,POINT(1 2)\n42,20,0,0,0,POINT(3 4)\n"
        );
        let segments = parse_traffic_csv(csv.as_bytes()).expect("parse");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].edge_id, 42);
    }

    #[test]
    fn bad_traffic_counts_become_zero() {
        let csv = format!("{HEADER}7,n/a,0,0,0,POINT(1 2)\n");
        let segments = parse_traffic_csv(csv.as_bytes()).expect("parse");
        assert_eq!(segments[0].weekday_traffic, 0);
    }

    #[test]
    fn short_rows_are_skipped() {
        let csv = format!("{HEADER}7,10,0\n8,11,0,0,0,POINT(1 2)\n");
        let segments = parse_traffic_csv(csv.as_bytes()).expect("parse");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].edge_id, 8);
    }

    #[test]
    fn legacy_encoded_street_names_keep_every_row() {
        let mut csv = HEADER.as_bytes().to_vec();
        csv.extend_from_slice(b"1,10,0,0,0,POINT(1 2)\n");
        csv.extend_from_slice(b"2,20,\xd3\xeb,0,0,POINT(3 4)\n");
        csv.extend_from_slice(b"3,30,0,0,0,POINT(5 6)\n");

        let segments = parse_traffic_csv(csv.as_slice()).expect("parse");
        let ids: Vec<i64> = segments.iter().map(|s| s.edge_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(segments[1].weekday_traffic, 20);
    }

    #[test]
    fn undecodable_key_columns_skip_or_zero() {
        let mut csv = HEADER.as_bytes().to_vec();
        csv.extend_from_slice(b"\xd3,10,0,0,0,POINT(1 2)\n");
        csv.extend_from_slice(b"4,\xeb,0,0,0,POINT(3 4)\n");
        csv.extend_from_slice(b"5,50,0,0,0,\xd3\xeb\n");

        let segments = parse_traffic_csv(csv.as_slice()).expect("parse");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].edge_id, 4);
        assert_eq!(segments[0].weekday_traffic, 0);
    }

    #[test]
    fn header_only_file_is_empty() {
        let segments = parse_traffic_csv(HEADER.as_bytes()).expect("parse");
        assert!(segments.is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "{HEADER}5,99,0,0,0,POINT(71.4 51.1)").expect("write");

        let segments = load_traffic_csv(file.path()).expect("load");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].weekday_traffic, 99);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_traffic_csv(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
