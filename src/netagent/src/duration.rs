use std::time::Duration;

use netmap_types::NetmapError;

/// Parses a Go-style duration string (`"60s"`, `"24h"`, `"300s"`). A bare
/// integer is treated as seconds.
pub fn parse(raw: &str) -> Result<Duration, NetmapError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(NetmapError::ValidationFailed("empty duration".into()));
    }
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    let (value, unit) = raw.split_at(raw.len() - 1);
    let value: u64 = value
        .parse()
        .map_err(|_| NetmapError::ValidationFailed(format!("invalid duration {raw:?}")))?;
    let secs = match unit {
        "s" => value,
        "m" => value * 60,
        "h" => value * 3600,
        other => {
            return Err(NetmapError::ValidationFailed(format!(
                "unsupported duration unit {other:?} in {raw:?}"
            )))
        }
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seconds_minutes_hours() {
        assert_eq!(parse("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse("45").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("abc").is_err());
    }
}
