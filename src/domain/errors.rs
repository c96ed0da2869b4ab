use std::path::PathBuf;
use thiserror::Error;

/// Errors reading a market log export.
#[derive(Debug, Error)]
pub enum MarketLogError {
    #[error("Failed to read market log {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed market log {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Market log {} contains no orders", .path.display())]
    Empty { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_log_error_formatting() {
        let error = MarketLogError::Empty {
            path: PathBuf::from("/tmp/The Forge-Tritanium.txt"),
        };

        let msg = error.to_string();
        assert!(msg.contains("The Forge-Tritanium.txt"));
        assert!(msg.contains("no orders"));
    }
}
