//! Booking workflow
//!
//! Pure state transitions. Each function checks the booking's current
//! status, computes the new booking, any hospital bed change and the audit
//! entry, and returns them without touching the store. The
//! [`BookingService`](crate::BookingService) persists the result.
//!
//! Bed bookings move `Pending -> Approved | Rejected` and
//! `Approved -> Discharged`; every other move fails with
//! [`WorkflowError::InvalidTransition`].

use crate::config::OverCommitPolicy;
use crate::error::{Unavailable, WorkflowAction, WorkflowError, WorkflowResult};
use crate::geo::{distance_between, estimate_eta_minutes, round_to};
use crate::rules::apply_bed_delta;
use chrono::{DateTime, Utc};
use medibed_types::{
    Ambulance, AmbulanceBooking, AuditAction, AuditEntry, Booking, BookingForm, BookingStatus,
    DischargeRecord, Entity, GeoPoint, Hospital, RecordMeta, UserIdentity,
};

/// Outcome of an admin action on a booking
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The booking with its new status
    pub booking: Booking,
    /// Hospital with updated bed counts; `None` when the counts do not move
    pub hospital: Option<Hospital>,
    pub audit: AuditEntry,
}

/// Outcome of discharging an admitted patient
#[derive(Debug, Clone, PartialEq)]
pub struct Discharge {
    pub booking: Booking,
    /// Hospital with the bed given back
    pub hospital: Hospital,
    pub record: DischargeRecord,
    pub audit: AuditEntry,
}

/// Outcome of dispatching an ambulance
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub booking: AmbulanceBooking,
    /// The ambulance, now unavailable
    pub ambulance: Ambulance,
}

fn ensure_transition(booking: &Booking, action: WorkflowAction) -> WorkflowResult<()> {
    if booking.status.can_transition_to(action.target()) {
        Ok(())
    } else {
        Err(WorkflowError::invalid_transition(booking.status, action))
    }
}

fn ensure_same_hospital(booking: &Booking, hospital: &Hospital) -> WorkflowResult<()> {
    if !hospital.id().is_empty() && booking.hospital_id != hospital.id() {
        return Err(WorkflowError::validation(
            "hospital_id",
            format!(
                "booking {} belongs to hospital '{}', not '{}'",
                booking.id(),
                booking.hospital_id,
                hospital.id()
            ),
        ));
    }
    Ok(())
}

fn with_status(booking: &Booking, status: BookingStatus) -> Booking {
    let mut next = booking.clone();
    next.status = status;
    next
}

/// Approve a pending booking and take one bed of its category.
///
/// With no free bed the outcome depends on `policy`: `Reject` fails with
/// [`WorkflowError::Unavailable`], `AllowWithoutDecrement` approves without
/// touching the counts.
pub fn approve(
    booking: &Booking,
    hospital: &Hospital,
    actor: &str,
    policy: OverCommitPolicy,
    now: DateTime<Utc>,
) -> WorkflowResult<Transition> {
    ensure_transition(booking, WorkflowAction::Approve)?;
    ensure_same_hospital(booking, hospital)?;

    let hospital = if hospital.beds_of(booking.bed_type).available > 0 {
        Some(apply_bed_delta(hospital, booking.bed_type, -1))
    } else {
        match policy {
            OverCommitPolicy::Reject => {
                return Err(WorkflowError::Unavailable(Unavailable::Bed {
                    bed_type: booking.bed_type,
                    hospital: hospital.name.clone(),
                }));
            }
            OverCommitPolicy::AllowWithoutDecrement => {
                log::warn!(
                    "approving booking {} with no free {} bed at {}",
                    booking.id(),
                    booking.bed_type,
                    hospital.name
                );
                None
            }
        }
    };

    let audit = AuditEntry::new(
        actor,
        AuditAction::BookingApproved,
        format!("Approved {} booking for {}", booking.bed_type, booking.patient_name),
        booking.hospital_id.clone(),
        now,
    )
    .related_to(booking.id());

    Ok(Transition {
        booking: with_status(booking, BookingStatus::Approved),
        hospital,
        audit,
    })
}

/// Reject a pending booking; bed counts never move
pub fn reject(booking: &Booking, actor: &str, now: DateTime<Utc>) -> WorkflowResult<Transition> {
    ensure_transition(booking, WorkflowAction::Reject)?;

    let audit = AuditEntry::new(
        actor,
        AuditAction::BookingRejected,
        format!("Rejected booking for {}", booking.patient_name),
        booking.hospital_id.clone(),
        now,
    )
    .related_to(booking.id());

    Ok(Transition {
        booking: with_status(booking, BookingStatus::Rejected),
        hospital: None,
        audit,
    })
}

/// Discharge an admitted patient, free the bed and write the discharge record.
///
/// The admission time is the booking's last update, which for an approved
/// booking is the approval.
pub fn discharge(
    booking: &Booking,
    hospital: &Hospital,
    actor: &str,
    now: DateTime<Utc>,
) -> WorkflowResult<Discharge> {
    ensure_transition(booking, WorkflowAction::Discharge)?;
    ensure_same_hospital(booking, hospital)?;

    let record = DischargeRecord {
        meta: RecordMeta::default(),
        patient_name: booking.patient_name.clone(),
        patient_email: booking.patient_email.clone(),
        hospital_id: booking.hospital_id.clone(),
        hospital_name: hospital.name.clone(),
        bed_type: booking.bed_type,
        condition_type: booking.condition_type,
        admitted_date: booking.meta.last_touched().unwrap_or(now),
        discharged_date: now,
        booking_id: booking.id().to_string(),
    };

    let audit = AuditEntry::new(
        actor,
        AuditAction::PatientDischarged,
        format!("Discharged {} from {} bed", booking.patient_name, booking.bed_type),
        booking.hospital_id.clone(),
        now,
    )
    .related_to(booking.id());

    Ok(Discharge {
        booking: with_status(booking, BookingStatus::Discharged),
        hospital: apply_bed_delta(hospital, booking.bed_type, 1),
        record,
        audit,
    })
}

/// Build a pending booking from the patient's form
pub fn create_booking(
    form: &BookingForm,
    patient: &UserIdentity,
    hospital: &Hospital,
    location: Option<GeoPoint>,
) -> WorkflowResult<Booking> {
    let patient_name = form.patient_name.trim();
    if patient_name.is_empty() {
        return Err(WorkflowError::validation("patient_name", "patient name is required"));
    }

    Ok(Booking {
        meta: RecordMeta::default(),
        patient_name: patient_name.to_string(),
        patient_email: patient.email.clone(),
        patient_phone: form.patient_phone.trim().to_string(),
        hospital_id: hospital.id().to_string(),
        hospital_name: hospital.name.clone(),
        bed_type: form.bed_type,
        condition_type: form.condition_type,
        notes: form.notes.clone(),
        status: BookingStatus::Pending,
        patient_latitude: location.map(|p| p.lat),
        patient_longitude: location.map(|p| p.lng),
    })
}

/// Audit entry for a booking request, with the patient as actor
pub fn booking_created_audit(booking: &Booking, now: DateTime<Utc>) -> AuditEntry {
    AuditEntry::new(
        booking.patient_email.clone(),
        AuditAction::BookingCreated,
        format!(
            "{} requested a {} bed ({})",
            booking.patient_name, booking.bed_type, booking.condition_type
        ),
        booking.hospital_id.clone(),
        now,
    )
    .related_to(booking.id())
}

/// Dispatch `ambulance` to `pickup`.
///
/// Distance and ETA are measured from the pickup point to the vehicle's
/// current position and frozen into the booking.
pub fn book_ambulance(
    ambulance: &Ambulance,
    patient: &UserIdentity,
    pickup: GeoPoint,
    destination: Option<&Hospital>,
) -> WorkflowResult<Dispatch> {
    if !ambulance.is_available {
        return Err(WorkflowError::Unavailable(Unavailable::Ambulance {
            vehicle_number: ambulance.vehicle_number.clone(),
        }));
    }

    let distance = distance_between(pickup, ambulance.location());
    let booking = AmbulanceBooking {
        meta: RecordMeta::default(),
        patient_email: patient.email.clone(),
        patient_name: patient.display_name().to_string(),
        ambulance_id: ambulance.id().to_string(),
        ambulance_type: ambulance.ambulance_type,
        vehicle_number: ambulance.vehicle_number.clone(),
        pickup_latitude: pickup.lat,
        pickup_longitude: pickup.lng,
        destination_hospital_id: ambulance.hospital_id.clone().unwrap_or_default(),
        destination_hospital_name: destination.map(|h| h.name.clone()).unwrap_or_default(),
        estimated_eta_minutes: estimate_eta_minutes(distance),
        distance_km: round_to(distance, 2),
    };

    let mut dispatched = ambulance.clone();
    dispatched.is_available = false;

    Ok(Dispatch {
        booking,
        ambulance: dispatched,
    })
}

/// Audit entry for an ambulance dispatch, with the patient as actor
pub fn ambulance_booked_audit(booking: &AmbulanceBooking, now: DateTime<Utc>) -> AuditEntry {
    AuditEntry::new(
        booking.patient_email.clone(),
        AuditAction::AmbulanceBooked,
        format!(
            "Booked {} ambulance {} (ETA {} min)",
            booking.ambulance_type, booking.vehicle_number, booking.estimated_eta_minutes
        ),
        booking.destination_hospital_id.clone(),
        now,
    )
    .related_to(booking.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use medibed_types::{AmbulanceType, BedCount, BedType, Condition, IcuLoad};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const ADMIN: &str = "admin@citygeneral.in";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    fn hospital(icu_available: u32, icu_total: u32) -> Hospital {
        let mut h = Hospital::new("City General", GeoPoint::new(17.385, 78.4867));
        h.meta.id = "h1".into();
        h.beds.icu = BedCount::new(icu_available, icu_total);
        h.beds.general = BedCount::new(0, 50);
        h.icu_load_prediction = crate::rules::icu_load_prediction(icu_available, icu_total);
        h
    }

    fn booking(status: BookingStatus, bed_type: BedType) -> Booking {
        Booking {
            meta: RecordMeta {
                id: "b1".into(),
                version: 1,
                created_date: Some(Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap()),
                updated_date: Some(Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap()),
            },
            patient_name: "Asha Rao".into(),
            patient_email: "asha@example.com".into(),
            patient_phone: String::new(),
            hospital_id: "h1".into(),
            hospital_name: "City General".into(),
            bed_type,
            condition_type: Condition::Serious,
            notes: String::new(),
            status,
            patient_latitude: None,
            patient_longitude: None,
        }
    }

    fn ambulance(available: bool) -> Ambulance {
        Ambulance {
            meta: RecordMeta {
                id: "a1".into(),
                ..RecordMeta::default()
            },
            vehicle_number: "HY 07 KT 4821".into(),
            ambulance_type: AmbulanceType::Als,
            city: "Hyderabad".into(),
            latitude: 17.40,
            longitude: 78.49,
            is_available: available,
            driver_name: "Driver 1".into(),
            driver_phone: None,
            hospital_id: Some("h1".into()),
        }
    }

    // === Approve ===

    #[test]
    fn test_approve_takes_icu_bed_and_recomputes_load() {
        let t = approve(
            &booking(BookingStatus::Pending, BedType::Icu),
            &hospital(3, 20),
            ADMIN,
            OverCommitPolicy::Reject,
            now(),
        )
        .unwrap();

        assert_eq!(t.booking.status, BookingStatus::Approved);
        let h = t.hospital.unwrap();
        assert_eq!(h.beds.icu, BedCount::new(2, 20));
        assert_eq!(h.icu_load_prediction, IcuLoad::High);
        assert_eq!(t.audit.action, AuditAction::BookingApproved);
        assert_eq!(t.audit.details, "Approved ICU booking for Asha Rao");
        assert_eq!(t.audit.admin_email, ADMIN);
        assert_eq!(t.audit.related_id.as_deref(), Some("b1"));
    }

    #[test]
    fn test_approve_without_bed_is_rejected_by_default() {
        let result = approve(
            &booking(BookingStatus::Pending, BedType::General),
            &hospital(5, 10),
            ADMIN,
            OverCommitPolicy::Reject,
            now(),
        );
        assert!(matches!(
            result,
            Err(WorkflowError::Unavailable(Unavailable::Bed { bed_type: BedType::General, .. }))
        ));
    }

    #[test]
    fn test_approve_without_bed_can_overcommit() {
        let t = approve(
            &booking(BookingStatus::Pending, BedType::General),
            &hospital(5, 10),
            ADMIN,
            OverCommitPolicy::AllowWithoutDecrement,
            now(),
        )
        .unwrap();
        assert_eq!(t.booking.status, BookingStatus::Approved);
        assert_eq!(t.hospital, None);
    }

    #[test]
    fn test_approve_for_other_hospital_fails() {
        let mut other = hospital(5, 10);
        other.meta.id = "h2".into();
        let result = approve(
            &booking(BookingStatus::Pending, BedType::Icu),
            &other,
            ADMIN,
            OverCommitPolicy::Reject,
            now(),
        );
        assert!(matches!(result, Err(WorkflowError::Validation { .. })));
    }

    // === Transition table ===

    #[rstest]
    #[case(BookingStatus::Approved, WorkflowAction::Approve)]
    #[case(BookingStatus::Rejected, WorkflowAction::Approve)]
    #[case(BookingStatus::Discharged, WorkflowAction::Approve)]
    #[case(BookingStatus::Approved, WorkflowAction::Reject)]
    #[case(BookingStatus::Rejected, WorkflowAction::Reject)]
    #[case(BookingStatus::Discharged, WorkflowAction::Reject)]
    #[case(BookingStatus::Pending, WorkflowAction::Discharge)]
    #[case(BookingStatus::Rejected, WorkflowAction::Discharge)]
    #[case(BookingStatus::Discharged, WorkflowAction::Discharge)]
    fn test_invalid_transitions(#[case] from: BookingStatus, #[case] action: WorkflowAction) {
        let b = booking(from, BedType::Icu);
        let h = hospital(5, 10);
        let error = match action {
            WorkflowAction::Approve => approve(&b, &h, ADMIN, OverCommitPolicy::Reject, now()).err(),
            WorkflowAction::Reject => reject(&b, ADMIN, now()).err(),
            WorkflowAction::Discharge => discharge(&b, &h, ADMIN, now()).err(),
        };
        assert_eq!(error, Some(WorkflowError::InvalidTransition { from, action }));
    }

    // === Reject / discharge ===

    #[test]
    fn test_reject_leaves_hospital_alone() {
        let t = reject(&booking(BookingStatus::Pending, BedType::Icu), ADMIN, now()).unwrap();
        assert_eq!(t.booking.status, BookingStatus::Rejected);
        assert_eq!(t.hospital, None);
        assert_eq!(t.audit.details, "Rejected booking for Asha Rao");
    }

    #[test]
    fn test_discharge_frees_bed_and_writes_record() {
        let b = booking(BookingStatus::Approved, BedType::Icu);
        let t = discharge(&b, &hospital(2, 20), ADMIN, now()).unwrap();

        assert_eq!(t.booking.status, BookingStatus::Discharged);
        assert_eq!(t.hospital.beds.icu, BedCount::new(3, 20));

        let record = t.record;
        assert_eq!(record.booking_id, "b1");
        assert_eq!(record.admitted_date, b.meta.updated_date.unwrap());
        assert_eq!(record.discharged_date, now());
        assert_eq!(record.condition_type, Condition::Serious);
        assert_eq!(t.audit.details, "Discharged Asha Rao from ICU bed");
    }

    #[test]
    fn test_discharge_at_full_capacity_clamps() {
        let t = discharge(&booking(BookingStatus::Approved, BedType::Icu), &hospital(20, 20), ADMIN, now())
            .unwrap();
        assert_eq!(t.hospital.beds.icu, BedCount::new(20, 20));
    }

    // === Patient actions ===

    #[test]
    fn test_create_booking_requires_name() {
        let form = BookingForm {
            patient_name: "   ".into(),
            bed_type: BedType::Icu,
            ..BookingForm::default()
        };
        let user = UserIdentity::new("asha@example.com");
        let result = create_booking(&form, &user, &hospital(5, 10), None);
        assert!(matches!(result, Err(WorkflowError::Validation { ref field, .. }) if field == "patient_name"));
    }

    #[test]
    fn test_create_booking_captures_location() {
        let form = BookingForm {
            patient_name: " Asha Rao ".into(),
            condition_type: Condition::Emergency,
            bed_type: BedType::Emergency,
            ..BookingForm::default()
        };
        let user = UserIdentity::new("asha@example.com");
        let b = create_booking(&form, &user, &hospital(5, 10), Some(GeoPoint::new(17.4, 78.5))).unwrap();

        assert_eq!(b.status, BookingStatus::Pending);
        assert_eq!(b.patient_name, "Asha Rao");
        assert_eq!(b.hospital_id, "h1");
        assert_eq!(b.hospital_name, "City General");
        assert_eq!(b.patient_location(), Some(GeoPoint::new(17.4, 78.5)));
    }

    #[test]
    fn test_book_ambulance_snapshots_distance() {
        let user = UserIdentity::new("asha@example.com");
        let pickup = GeoPoint::new(17.385, 78.4867);
        let dispatch = book_ambulance(&ambulance(true), &user, pickup, Some(&hospital(5, 10))).unwrap();

        let expected = distance_between(pickup, GeoPoint::new(17.40, 78.49));
        assert_eq!(dispatch.booking.distance_km, round_to(expected, 2));
        assert_eq!(dispatch.booking.estimated_eta_minutes, estimate_eta_minutes(expected));
        assert_eq!(dispatch.booking.patient_name, "asha@example.com");
        assert_eq!(dispatch.booking.destination_hospital_id, "h1");
        assert_eq!(dispatch.booking.destination_hospital_name, "City General");
        assert!(!dispatch.ambulance.is_available);
    }

    #[test]
    fn test_book_dispatched_ambulance_fails() {
        let user = UserIdentity::new("asha@example.com");
        let result = book_ambulance(&ambulance(false), &user, GeoPoint::new(17.385, 78.4867), None);
        assert!(matches!(result, Err(WorkflowError::Unavailable(Unavailable::Ambulance { .. }))));
    }
}
