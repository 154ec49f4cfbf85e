use routetrace_core::{GpsFix, LatLng};

use crate::distance::haversine_m;

/// Keep fixes whose reported accuracy is within `threshold_m` metres.
#[must_use]
pub fn filter_by_accuracy(fixes: Vec<GpsFix>, threshold_m: f64) -> Vec<GpsFix> {
    let before = fixes.len();
    let kept: Vec<GpsFix> = fixes
        .into_iter()
        .filter(|f| f.accuracy_m <= threshold_m)
        .collect();
    tracing::debug!(before, after = kept.len(), threshold_m, "accuracy filter");
    kept
}

/// Keep fixes recorded for `rep_id`, compared after trimming.
#[must_use]
pub fn filter_by_rep(fixes: &[GpsFix], rep_id: &str) -> Vec<GpsFix> {
    let rep_id = rep_id.trim();
    fixes
        .iter()
        .filter(|f| f.rep_id.as_deref().map(str::trim) == Some(rep_id))
        .cloned()
        .collect()
}

/// Thin a path so consecutive kept points are at least `min_distance_m` apart.
///
/// The first point is always kept; each later point is compared against the
/// last *kept* point, not its immediate predecessor.
#[must_use]
pub fn filter_by_distance(points: &[LatLng], min_distance_m: f64) -> Vec<LatLng> {
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut kept = vec![first];
    for &point in rest {
        let last = kept[kept.len() - 1];
        if haversine_m(last, point) >= min_distance_m {
            kept.push(point);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn fix(lat: f64, accuracy_m: f64) -> GpsFix {
        GpsFix {
            position: LatLng::new(lat, 80.0),
            accuracy_m,
            recorded_at: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            rep_id: None,
        }
    }

    fn rep_fix(lat: f64, rep_id: &str) -> GpsFix {
        GpsFix {
            rep_id: Some(rep_id.to_string()),
            ..fix(lat, 5.0)
        }
    }

    #[test]
    fn rep_filter_matches_trimmed_ids() {
        let fixes = vec![
            rep_fix(6.0, "7"),
            rep_fix(6.1, "8"),
            rep_fix(6.2, " 7 "),
            fix(6.3, 5.0),
        ];
        let kept = filter_by_rep(&fixes, "7 ");
        let ids: Vec<Option<&str>> = kept.iter().map(|f| f.rep_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("7"), Some(" 7 ")]);
        assert!(filter_by_rep(&fixes, "42").is_empty());
    }

    #[test]
    fn accuracy_threshold_is_inclusive() {
        let kept = filter_by_accuracy(vec![fix(6.0, 5.0), fix(6.1, 20.0), fix(6.2, 20.5)], 20.0);
        assert_eq!(kept.len(), 2);
        assert!((kept[1].position.lat - 6.1).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_filter_empty_input() {
        assert!(filter_by_distance(&[], 10.0).is_empty());
    }

    #[test]
    fn distance_filter_compares_against_last_kept_point() {
        // ~5.5 m steps north: each step alone is under 10 m, two steps are not.
        let step = 0.00005;
        let points: Vec<LatLng> = (0..5)
            .map(|i| LatLng::new(6.0 + step * f64::from(i), 80.0))
            .collect();
        let kept = filter_by_distance(&points, 10.0);
        assert_eq!(kept, vec![points[0], points[2], points[4]]);
    }

    #[test]
    fn distance_filter_zero_threshold_keeps_everything() {
        let points = vec![LatLng::new(6.0, 80.0), LatLng::new(6.0, 80.0)];
        assert_eq!(filter_by_distance(&points, 0.0).len(), 2);
    }
}
