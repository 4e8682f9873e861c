//! Key-result progress normalization.
//!
//! Converts the heterogeneous KR representations (boolean, percent, numeric
//! with baseline/direction) into a single percentage. Progress is floored at
//! 0 but deliberately NOT capped at 100, so over-achievement stays visible.
//! Every degenerate-denominator path returns 0 rather than erroring.

use super::{KeyResult, KrDirection, KrKind};

/// Normalize a key result to an integer progress percentage.
///
/// An explicit `progress` field wins over the kind-based computation:
/// values <= 1 are treated as ratios and scaled x100, values > 1 as
/// already-percent.
pub fn normalize_progress(kr: &KeyResult) -> i64 {
    if let Some(p) = kr.progress {
        let pct = if p <= 1.0 { p * 100.0 } else { p };
        return floor_at_zero(pct);
    }

    match kr.kind {
        KrKind::Boolean => {
            if kr.current_value != 0.0 {
                100
            } else {
                0
            }
        }
        KrKind::Percent => floor_at_zero(kr.current_value),
        KrKind::Numeric => match kr.direction {
            KrDirection::Increasing => {
                if kr.target_value <= 0.0 {
                    return 0;
                }
                floor_at_zero(kr.current_value / kr.target_value * 100.0)
            }
            KrDirection::Decreasing => {
                let baseline = match kr.baseline_value {
                    Some(b) => b,
                    None => return 0,
                };
                if baseline == 0.0 || baseline == kr.target_value {
                    return 0;
                }
                floor_at_zero((baseline - kr.current_value) / (baseline - kr.target_value) * 100.0)
            }
        },
    }
}

fn floor_at_zero(pct: f64) -> i64 {
    if !pct.is_finite() {
        return 0;
    }
    let rounded = pct.round() as i64;
    rounded.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_kr() -> KeyResult {
        KeyResult {
            id: "kr".into(),
            description: String::new(),
            current_value: 0.0,
            target_value: 0.0,
            baseline_value: None,
            direction: KrDirection::Increasing,
            kind: KrKind::Numeric,
            progress: None,
            punted: false,
        }
    }

    #[test]
    fn explicit_ratio_scales_to_percent() {
        let kr = KeyResult {
            progress: Some(0.42),
            ..base_kr()
        };
        assert_eq!(normalize_progress(&kr), 42);
    }

    #[test]
    fn explicit_percent_passes_through() {
        let kr = KeyResult {
            progress: Some(73.0),
            ..base_kr()
        };
        assert_eq!(normalize_progress(&kr), 73);
    }

    #[test]
    fn over_achievement_not_capped() {
        let kr = KeyResult {
            progress: Some(142.0),
            ..base_kr()
        };
        assert_eq!(normalize_progress(&kr), 142);
    }

    #[test]
    fn explicit_one_is_full_ratio() {
        let kr = KeyResult {
            progress: Some(1.0),
            ..base_kr()
        };
        assert_eq!(normalize_progress(&kr), 100);
    }

    #[test]
    fn boolean_is_all_or_nothing() {
        let done = KeyResult {
            kind: KrKind::Boolean,
            current_value: 1.0,
            ..base_kr()
        };
        let not_done = KeyResult {
            kind: KrKind::Boolean,
            current_value: 0.0,
            ..base_kr()
        };
        assert_eq!(normalize_progress(&done), 100);
        assert_eq!(normalize_progress(&not_done), 0);
    }

    #[test]
    fn percent_floors_negative_at_zero() {
        let kr = KeyResult {
            kind: KrKind::Percent,
            current_value: -12.0,
            ..base_kr()
        };
        assert_eq!(normalize_progress(&kr), 0);
    }

    #[test]
    fn numeric_up_divides_by_target() {
        let kr = KeyResult {
            current_value: 30.0,
            target_value: 40.0,
            ..base_kr()
        };
        assert_eq!(normalize_progress(&kr), 75);
    }

    #[test]
    fn numeric_up_zero_target_is_zero() {
        let kr = KeyResult {
            current_value: 30.0,
            target_value: 0.0,
            ..base_kr()
        };
        assert_eq!(normalize_progress(&kr), 0);
    }

    #[test]
    fn numeric_down_uses_baseline() {
        // Countdown: 90kg baseline, 80kg target, now 85kg -> halfway.
        let kr = KeyResult {
            direction: KrDirection::Decreasing,
            baseline_value: Some(90.0),
            target_value: 80.0,
            current_value: 85.0,
            ..base_kr()
        };
        assert_eq!(normalize_progress(&kr), 50);
    }

    #[test]
    fn numeric_down_degenerate_denominators_are_zero() {
        let same = KeyResult {
            direction: KrDirection::Decreasing,
            baseline_value: Some(80.0),
            target_value: 80.0,
            current_value: 80.0,
            ..base_kr()
        };
        let zero_baseline = KeyResult {
            direction: KrDirection::Decreasing,
            baseline_value: Some(0.0),
            target_value: 10.0,
            current_value: 5.0,
            ..base_kr()
        };
        let no_baseline = KeyResult {
            direction: KrDirection::Decreasing,
            baseline_value: None,
            target_value: 10.0,
            current_value: 5.0,
            ..base_kr()
        };
        assert_eq!(normalize_progress(&same), 0);
        assert_eq!(normalize_progress(&zero_baseline), 0);
        assert_eq!(normalize_progress(&no_baseline), 0);
    }
}
