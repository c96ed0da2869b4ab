use crate::domain::errors::MarketLogError;
use crate::domain::orders::MarketLogRecord;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads a market log export in full.
///
/// A malformed row fails the whole read: the game writes each export
/// atomically, so a torn file means we raced the write and the next poll
/// will see the complete file.
pub fn read_market_log(path: &Path) -> Result<Vec<MarketLogRecord>, MarketLogError> {
    let file = File::open(path).map_err(|source| MarketLogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: MarketLogRecord = row.map_err(|source| MarketLogError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(record);
    }
    if records.is_empty() {
        return Err(MarketLogError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use std::path::PathBuf;

    fn write_log(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("outbid-reader-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_reads_a_game_export() {
        let path = write_log(
            "ok.txt",
            "\
price,volRemaining,typeID,range,orderID,volEntered,minVolume,bid,issueDate,duration,stationID,regionID,solarSystemID,jumps
4.87,250000.0,34,32767,6180551923,250000,1,False,2026-08-21 18:23:45.000,90,60003760,10000002,30000142,0
5.01,10000.0,34,-1,6180551924,10000,1,True,2026-08-21 18:25:00.000,30,60003760,10000002,30000142,2
",
        );

        let records = read_market_log(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].price, dec!(4.87));
        assert!(!records[0].bid);
        assert_eq!(records[0].order_id, 6_180_551_923);
        assert_eq!(records[1].jumps, 2);
        assert!(records[1].bid);
        assert_eq!(records[1].issue_date.format("%Y-%m-%d").to_string(), "2026-08-21");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_header_only_export_is_empty() {
        let path = write_log(
            "empty.txt",
            "price,volRemaining,typeID,range,orderID,volEntered,minVolume,bid,issueDate,duration,stationID,regionID,solarSystemID,jumps\n",
        );

        let result = read_market_log(&path);
        assert!(matches!(result, Err(MarketLogError::Empty { .. })));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_torn_file_is_rejected() {
        let path = write_log(
            "torn.txt",
            "\
price,volRemaining,typeID,range,orderID,volEntered,minVolume,bid,issueDate,duration,stationID,regionID,solarSystemID,jumps
4.87,250000.0,34,32767,6180551923,250000,1,Fal
",
        );

        let result = read_market_log(&path);
        assert!(matches!(result, Err(MarketLogError::Malformed { .. })));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = read_market_log(Path::new("/nonexistent/marketlog.txt"));
        assert!(matches!(result, Err(MarketLogError::Io { .. })));
    }
}
