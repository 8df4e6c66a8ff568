//! Bed inventory rule engine
//!
//! Every change to a hospital's bed counts goes through this module. The
//! functions here keep `0 <= available <= total` for each category and
//! recompute the derived ICU load whenever ICU counts move.

use medibed_types::{BedCount, BedCounts, BedType, Hospital, IcuLoad};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ICU availability at or below this percentage is high load
pub const HIGH_LOAD_MAX_PERCENT: f64 = 15.0;

/// ICU availability at or below this percentage (and above high) is medium load
pub const MEDIUM_LOAD_MAX_PERCENT: f64 = 40.0;

/// Share of free beds, `0` when the category has no beds
pub fn occupancy_percent(available: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(available) / f64::from(total) * 100.0).clamp(0.0, 100.0)
}

/// Classify ICU scarcity.
///
/// A hospital without ICU beds counts as fully available (safe).
pub fn icu_load_prediction(icu_available: u32, icu_total: u32) -> IcuLoad {
    let pct = if icu_total > 0 {
        f64::from(icu_available) / f64::from(icu_total) * 100.0
    } else {
        100.0
    };

    if pct <= HIGH_LOAD_MAX_PERCENT {
        IcuLoad::High
    } else if pct <= MEDIUM_LOAD_MAX_PERCENT {
        IcuLoad::Medium
    } else {
        IcuLoad::Safe
    }
}

/// ICU load for a full inventory
pub fn icu_load_for(beds: &BedCounts) -> IcuLoad {
    icu_load_prediction(beds.icu.available, beds.icu.total)
}

/// Clamp `available` into `[0, total]`
pub fn normalize(count: BedCount) -> BedCount {
    BedCount::new(count.available.min(count.total), count.total)
}

/// Move `available` by `delta`, clamped into `[0, total]`
pub fn shift(count: BedCount, delta: i64) -> BedCount {
    let moved = i64::from(count.available).saturating_add(delta);
    let available = moved.clamp(0, i64::from(count.total));
    // Bounded by `total`, which is a u32
    BedCount::new(u32::try_from(available).unwrap_or(count.total), count.total)
}

/// Return a copy of `hospital` with one category's availability moved by
/// `delta`, clamped, and the ICU load recomputed.
pub fn apply_bed_delta(hospital: &Hospital, bed_type: BedType, delta: i64) -> Hospital {
    let mut next = hospital.clone();
    let slot = next.beds.get_mut(bed_type);
    *slot = shift(*slot, delta);
    next.icu_load_prediction = icu_load_for(&next.beds);

    log::debug!(
        "bed delta {:+} on {} {} -> {} (icu load {})",
        delta,
        hospital.name,
        bed_type,
        next.beds.get(bed_type),
        next.icu_load_prediction
    );
    next
}

/// Return a copy of `hospital` with every count replaced by `counts`.
///
/// Each `available` is clamped to its `total`.
pub fn set_bed_counts(hospital: &Hospital, counts: BedCounts) -> Hospital {
    let mut next = hospital.clone();
    for bed_type in BedType::ALL {
        *next.beds.get_mut(bed_type) = normalize(counts.get(bed_type));
    }
    next.icu_load_prediction = icu_load_for(&next.beds);
    next
}

/// Audit text for an admin bed edit
pub fn bed_update_details(beds: &BedCounts) -> String {
    format!("Updated bed counts. ICU: {}", beds.icu)
}

/// Colour band used when listing availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityBand {
    Good,
    Limited,
    Critical,
}

impl AvailabilityBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityBand::Good => "good",
            AvailabilityBand::Limited => "limited",
            AvailabilityBand::Critical => "critical",
        }
    }
}

impl fmt::Display for AvailabilityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn availability_band(available: u32, total: u32) -> AvailabilityBand {
    band_for_percent(occupancy_percent(available, total))
}

/// Band of all categories together; sums are taken in u64
pub fn overall_availability_band(beds: &BedCounts) -> AvailabilityBand {
    let (free, total) = beds.iter().fold((0u64, 0u64), |(free, total), (_, c)| {
        (free + u64::from(c.available), total + u64::from(c.total))
    });
    if total == 0 {
        return AvailabilityBand::Critical;
    }
    band_for_percent((free as f64 / total as f64 * 100.0).clamp(0.0, 100.0))
}

fn band_for_percent(pct: f64) -> AvailabilityBand {
    if pct > 50.0 {
        AvailabilityBand::Good
    } else if pct > 20.0 {
        AvailabilityBand::Limited
    } else {
        AvailabilityBand::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibed_types::GeoPoint;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn hospital_with_icu(available: u32, total: u32) -> Hospital {
        let mut h = Hospital::new("City General", GeoPoint::new(17.385, 78.4867));
        h.beds.icu = BedCount::new(available, total);
        h.beds.general = BedCount::new(40, 100);
        h.icu_load_prediction = icu_load_prediction(available, total);
        h
    }

    #[rstest]
    #[case(3, 20, IcuLoad::High)]
    #[case(2, 20, IcuLoad::High)]
    #[case(0, 20, IcuLoad::High)]
    #[case(3, 200, IcuLoad::High)]
    #[case(4, 20, IcuLoad::Medium)]
    #[case(8, 20, IcuLoad::Medium)]
    #[case(9, 20, IcuLoad::Safe)]
    #[case(20, 20, IcuLoad::Safe)]
    #[case(0, 0, IcuLoad::Safe)]
    fn test_icu_load_prediction(#[case] available: u32, #[case] total: u32, #[case] expected: IcuLoad) {
        assert_eq!(icu_load_prediction(available, total), expected);
    }

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(5, 10, 50.0)]
    #[case(10, 10, 100.0)]
    #[case(12, 10, 100.0)]
    fn test_occupancy_percent(#[case] available: u32, #[case] total: u32, #[case] expected: f64) {
        assert_eq!(occupancy_percent(available, total), expected);
    }

    #[rstest]
    #[case(6, 10, AvailabilityBand::Good)]
    #[case(5, 10, AvailabilityBand::Limited)]
    #[case(3, 10, AvailabilityBand::Limited)]
    #[case(2, 10, AvailabilityBand::Critical)]
    #[case(0, 0, AvailabilityBand::Critical)]
    fn test_availability_band(#[case] available: u32, #[case] total: u32, #[case] expected: AvailabilityBand) {
        assert_eq!(availability_band(available, total), expected);
    }

    #[test]
    fn test_overall_band_sums_without_overflow() {
        let huge = BedCount::new(u32::MAX, u32::MAX);
        let beds = BedCounts {
            icu: huge,
            general: huge,
            emergency: BedCount::new(0, u32::MAX),
            ventilator: BedCount::new(0, u32::MAX),
        };
        // 2 of 4 categories free is exactly 50%
        assert_eq!(overall_availability_band(&beds), AvailabilityBand::Limited);

        let beds = BedCounts {
            icu: huge,
            general: huge,
            emergency: huge,
            ventilator: BedCount::new(0, 10),
        };
        assert_eq!(overall_availability_band(&beds), AvailabilityBand::Good);
        assert_eq!(overall_availability_band(&BedCounts::default()), AvailabilityBand::Critical);
    }

    #[test]
    fn test_decrement_icu_recomputes_load() {
        let h = hospital_with_icu(3, 20);
        let next = apply_bed_delta(&h, BedType::Icu, -1);
        assert_eq!(next.beds.icu, BedCount::new(2, 20));
        assert_eq!(next.icu_load_prediction, IcuLoad::High);
        // Input untouched
        assert_eq!(h.beds.icu, BedCount::new(3, 20));
    }

    #[test]
    fn test_approve_style_decrement_on_half_full_icu() {
        let next = apply_bed_delta(&hospital_with_icu(5, 10), BedType::Icu, -1);
        assert_eq!(next.beds.icu, BedCount::new(4, 10));
        assert_eq!(next.icu_load_prediction, IcuLoad::Medium);
    }

    #[test]
    fn test_delta_clamps_at_both_ends() {
        let h = hospital_with_icu(0, 20);
        assert_eq!(apply_bed_delta(&h, BedType::Icu, -1).beds.icu, BedCount::new(0, 20));

        let h = hospital_with_icu(20, 20);
        assert_eq!(apply_bed_delta(&h, BedType::Icu, 1).beds.icu, BedCount::new(20, 20));
    }

    #[test]
    fn test_non_icu_delta_keeps_icu_load() {
        let h = hospital_with_icu(9, 20);
        let next = apply_bed_delta(&h, BedType::General, -1);
        assert_eq!(next.beds.general, BedCount::new(39, 100));
        assert_eq!(next.icu_load_prediction, IcuLoad::Safe);
    }

    #[test]
    fn test_set_bed_counts_clamps_and_recomputes() {
        let h = hospital_with_icu(10, 20);
        let counts = BedCounts {
            icu: BedCount::new(2, 20),
            general: BedCount::new(150, 120),
            emergency: BedCount::new(5, 10),
            ventilator: BedCount::default(),
        };
        let next = set_bed_counts(&h, counts);
        assert_eq!(next.beds.icu, BedCount::new(2, 20));
        assert_eq!(next.beds.general, BedCount::new(120, 120));
        assert_eq!(next.icu_load_prediction, IcuLoad::High);
        assert_eq!(bed_update_details(&next.beds), "Updated bed counts. ICU: 2/20");
    }

    proptest! {
        #[test]
        fn prop_delta_stays_in_range(
            total in 0u32..500,
            available in 0u32..600,
            delta in -1000i64..1000,
        ) {
            let start = BedCount::new(available, total);
            let moved = shift(start, delta);
            prop_assert!(moved.available <= moved.total);
            prop_assert_eq!(moved.total, total);
        }

        #[test]
        fn prop_occupancy_in_bounds(available in 0u32..1000, total in 0u32..1000) {
            let pct = occupancy_percent(available, total);
            prop_assert!((0.0..=100.0).contains(&pct));
        }

        #[test]
        fn prop_icu_load_matches_stored_counts(available in 0u32..60, total in 0u32..60, delta in -5i64..5) {
            let mut h = Hospital::new("H", GeoPoint::new(0.0, 0.0));
            h.beds.icu = normalize(BedCount::new(available, total));
            let next = apply_bed_delta(&h, BedType::Icu, delta);
            prop_assert_eq!(
                next.icu_load_prediction,
                icu_load_prediction(next.beds.icu.available, next.beds.icu.total)
            );
        }
    }
}
