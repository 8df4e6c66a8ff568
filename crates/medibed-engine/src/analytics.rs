//! Admin dashboard figures

use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use medibed_types::{
    AmbulanceBooking, BedType, Booking, BookingStatus, Condition, DischargeRecord, Hospital,
};
use serde::Serialize;

/// Occupied and free beds of one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BedOccupancy {
    pub bed_type: BedType,
    pub occupied: u32,
    pub available: u32,
}

/// Admissions and discharges on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyFlow {
    pub date: NaiveDate,
    pub admissions: usize,
    pub discharges: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub bookings: usize,
    pub admitted: usize,
    pub discharged: usize,
    pub ambulance_trips: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalAnalytics {
    pub hospital_id: String,
    pub hospital_name: String,
    pub occupancy: Vec<BedOccupancy>,
    /// Bookings per condition; conditions without bookings are left out
    pub severity: IndexMap<Condition, usize>,
    /// The last seven days ending `today`, oldest first
    pub daily: Vec<DailyFlow>,
    pub totals: Totals,
}

/// Number of days in the admissions chart
pub const DAILY_WINDOW: u64 = 7;

/// Compute the dashboard for `hospital`.
///
/// An admission is an Approved booking created that day; a discharge is a
/// discharge record discharged that day. Days are UTC calendar days.
pub fn hospital_analytics(
    hospital: &Hospital,
    bookings: &[Booking],
    discharges: &[DischargeRecord],
    ambulance_bookings: &[AmbulanceBooking],
    today: NaiveDate,
) -> HospitalAnalytics {
    let occupancy = hospital
        .beds
        .iter()
        .map(|(bed_type, count)| BedOccupancy {
            bed_type,
            occupied: count.occupied(),
            available: count.available,
        })
        .collect();

    let severity = Condition::ALL
        .into_iter()
        .map(|c| (c, bookings.iter().filter(|b| b.condition_type == c).count()))
        .filter(|(_, n)| *n > 0)
        .collect();

    let daily = (0..DAILY_WINDOW)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| DailyFlow {
            date,
            admissions: bookings
                .iter()
                .filter(|b| b.status == BookingStatus::Approved)
                .filter(|b| b.meta.created_date.map(|d| d.date_naive()) == Some(date))
                .count(),
            discharges: discharges
                .iter()
                .filter(|d| d.discharged_date.date_naive() == date)
                .count(),
        })
        .collect();

    let totals = Totals {
        bookings: bookings.len(),
        admitted: bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Approved)
            .count(),
        discharged: discharges.len(),
        ambulance_trips: ambulance_bookings.len(),
    };

    HospitalAnalytics {
        hospital_id: hospital.meta.id.clone(),
        hospital_name: hospital.name.clone(),
        occupancy,
        severity,
        daily,
        totals,
    }
}
