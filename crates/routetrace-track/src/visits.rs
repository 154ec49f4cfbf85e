//! Shop-visit detection over a timestamped track.

use chrono::NaiveDateTime;
use routetrace_core::{GpsFix, Shop, VisitRecord};

use crate::distance::haversine_m;

/// Thresholds that turn raw in-zone stretches into reported visits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisitRules {
    /// Stretches shorter than this are dropped before merging.
    pub min_duration_min: f64,
    /// Consecutive visits to the same shop separated by at most this gap are merged.
    pub merge_gap_min: f64,
}

impl Default for VisitRules {
    fn default() -> Self {
        Self {
            min_duration_min: 1.0,
            merge_gap_min: 5.0,
        }
    }
}

/// Detect visits to `shops` in a time-ordered track.
///
/// A visit starts at the first fix inside a shop's radius and ends at the
/// last fix before the track leaves it. A stretch still inside the radius
/// when the track ends is not reported. Results are ordered by check-in time
/// and then passed through [`merge_close_visits`].
#[must_use]
pub fn detect_shop_visits(fixes: &[GpsFix], shops: &[Shop], rules: VisitRules) -> Vec<VisitRecord> {
    let mut visits = Vec::new();

    for shop in shops {
        let mut entered: Option<&GpsFix> = None;
        let mut last_inside: Option<&GpsFix> = None;

        for fix in fixes {
            let inside = haversine_m(fix.position, shop.location) <= shop.radius_m;
            if inside {
                entered.get_or_insert(fix);
                last_inside = Some(fix);
            } else if let (Some(start), Some(end)) = (entered.take(), last_inside.take()) {
                push_if_long_enough(&mut visits, shop, start, end, rules);
            }
        }
        // A stay with no fix outside the radius after it has no check-out.
    }

    visits.sort_by_key(|v| v.check_in_at);
    merge_close_visits(visits, rules.merge_gap_min)
}

fn push_if_long_enough(
    visits: &mut Vec<VisitRecord>,
    shop: &Shop,
    start: &GpsFix,
    end: &GpsFix,
    rules: VisitRules,
) {
    let duration = minutes_between(start.recorded_at, end.recorded_at);
    if duration < rules.min_duration_min {
        tracing::trace!(shop = %shop.name, duration, "ignoring short stop");
        return;
    }
    visits.push(VisitRecord {
        shop: shop.name.clone(),
        check_in: start.position,
        check_out: end.position,
        duration_min: round2(duration),
        check_in_at: Some(start.recorded_at),
        check_out_at: Some(end.recorded_at),
    });
}

/// Merge consecutive visits to the same shop whose gap is at most `gap_threshold_min`.
///
/// The merged visit keeps the first check-in, takes the later check-out, and
/// has its duration recomputed. Visits without timestamps are never merged.
#[must_use]
pub fn merge_close_visits(visits: Vec<VisitRecord>, gap_threshold_min: f64) -> Vec<VisitRecord> {
    let mut merged: Vec<VisitRecord> = Vec::with_capacity(visits.len());

    for visit in visits {
        if let Some(last) = merged.last_mut() {
            if let (Some(last_in), Some(last_out), Some(next_in), Some(next_out)) = (
                last.check_in_at,
                last.check_out_at,
                visit.check_in_at,
                visit.check_out_at,
            ) {
                if visit.shop == last.shop && minutes_between(last_out, next_in) <= gap_threshold_min
                {
                    last.check_out = visit.check_out;
                    last.check_out_at = Some(next_out);
                    last.duration_min = round2(minutes_between(last_in, next_out));
                    continue;
                }
            }
        }
        merged.push(visit);
    }

    merged
}

#[allow(clippy::cast_precision_loss)]
fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
