use crate::provider::CpuInfo;
use nodestat_core::{NodeError, Result};

/// Clamp a reported usage figure: anything outside `[0, 100]` (or NaN) is 0.
pub fn sanitize_percent(value: f64) -> f64 {
    if (0.0..=100.0).contains(&value) {
        value
    } else {
        0.0
    }
}

/// Model name of the first CPU; an empty list means CPU info is unavailable.
pub fn first_model(cpus: &[CpuInfo]) -> Result<String> {
    cpus.first()
        .map(|c| c.model_name.clone())
        .ok_or_else(|| NodeError::unavailable("no CPU info reported"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_percent_is_kept() {
        assert_eq!(sanitize_percent(0.0), 0.0);
        assert_eq!(sanitize_percent(42.5), 42.5);
        assert_eq!(sanitize_percent(100.0), 100.0);
    }

    #[test]
    fn out_of_range_percent_is_zero() {
        assert_eq!(sanitize_percent(-0.5), 0.0);
        assert_eq!(sanitize_percent(100.01), 0.0);
        assert_eq!(sanitize_percent(f64::NAN), 0.0);
        assert_eq!(sanitize_percent(f64::INFINITY), 0.0);
    }

    #[test]
    fn first_model_picks_first_entry() {
        let cpus = vec![
            CpuInfo { model_name: "AMD Ryzen 7".into() },
            CpuInfo { model_name: "other".into() },
        ];
        assert_eq!(first_model(&cpus).unwrap(), "AMD Ryzen 7");
        assert!(first_model(&[]).is_err());
    }
}
