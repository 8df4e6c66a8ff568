//! Booking service
//!
//! Runs the pure workflow against the entity store. Hospital bed counts are
//! written with version-checked updates: on a conflict the hospital is
//! re-read and the rule engine applied again, up to
//! [`WorkflowConfig::max_update_attempts`] times.
//!
//! Write order for approval is bed decrement, booking status, audit entry.
//! Discharge writes the booking status, the bed increment, the discharge
//! record and the audit entry. When a later write fails the earlier ones are
//! compensated, so a failed action leaves the booking where it was and can
//! be retried. An ambulance dispatch releases the vehicle again when its
//! booking cannot be written.

use crate::analytics::{HospitalAnalytics, hospital_analytics};
use crate::config::WorkflowConfig;
use crate::error::{Unavailable, WorkflowError, WorkflowResult};
use crate::rules::{apply_bed_delta, bed_update_details, set_bed_counts};
use crate::workflow::{self, Transition};
use chrono::Utc;
use medibed_store::{
    AuthProvider, EntityStore, Filter, FixedLocation, LocationSource, Record, Repository,
    SortSpec, StoreError, fields,
};
use medibed_types::{
    Ambulance, AmbulanceBooking, AuditAction, AuditEntry, BedCounts, BedType, Booking,
    BookingForm, BookingStatus, DischargeRecord, Entity, EntityKind, GeoPoint, Hospital,
    UserIdentity,
};
use serde_json::json;
use std::sync::Arc;

fn bed_fields(hospital: &Hospital) -> Result<Record, StoreError> {
    let mut record = Record::new();
    record.insert("beds".into(), serde_json::to_value(hospital.beds)?);
    record.insert(
        "icu_load_prediction".into(),
        serde_json::to_value(hospital.icu_load_prediction)?,
    );
    Ok(record)
}

fn status_fields(status: BookingStatus) -> Record {
    fields(json!({ "status": status.as_str() }))
}

/// Workflow front door used by the CLI and by embedding applications
#[derive(Clone)]
pub struct BookingService {
    repo: Repository,
    auth: Arc<dyn AuthProvider>,
    location: Arc<dyn LocationSource>,
    config: WorkflowConfig,
}

impl BookingService {
    pub fn new(store: Arc<dyn EntityStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            repo: Repository::new(store),
            auth,
            location: Arc::new(FixedLocation::unknown()),
            config: WorkflowConfig::default(),
        }
    }

    pub fn with_location(mut self, location: Arc<dyn LocationSource>) -> Self {
        self.location = location;
        self
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.location.location()
    }

    pub async fn current_user(&self) -> WorkflowResult<UserIdentity> {
        Ok(self.auth.current_user().await?)
    }

    /// Read-modify-write of a hospital's bed fields.
    ///
    /// `plan` sees the freshest hospital and returns the hospital to write
    /// (or `None` to leave it alone) plus a value handed back to the caller.
    async fn update_beds<T, F>(&self, hospital_id: &str, mut plan: F) -> WorkflowResult<(Hospital, T)>
    where
        F: FnMut(&Hospital) -> WorkflowResult<(Option<Hospital>, T)> + Send,
        T: Send,
    {
        let attempts = self.config.max_update_attempts.max(1);
        for attempt in 1..=attempts {
            let current: Hospital = self.repo.get(hospital_id).await?;
            let (next, output) = plan(&current)?;
            let Some(mut next) = next else {
                return Ok((current, output));
            };

            match self
                .repo
                .update_if_version::<Hospital>(hospital_id, current.version(), bed_fields(&next)?)
                .await
            {
                Ok(version) => {
                    next.meta.version = version;
                    return Ok((next, output));
                }
                Err(StoreError::VersionConflict { actual, .. }) => {
                    log::warn!(
                        "hospital {} changed concurrently (attempt {}/{}, now at version {})",
                        hospital_id,
                        attempt,
                        attempts,
                        actual
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(WorkflowError::conflict(EntityKind::Hospital, hospital_id))
    }

    /// Compensating bed move after a later write failed; failures are logged
    async fn compensate_beds(&self, hospital_id: &str, bed_type: BedType, delta: i64) {
        let result = self
            .update_beds(hospital_id, |h| Ok((Some(apply_bed_delta(h, bed_type, delta)), ())))
            .await;
        if let Err(err) = result {
            log::error!(
                "failed to move {} {} bed(s) at hospital {}: {}",
                delta,
                bed_type,
                hospital_id,
                err
            );
        }
    }

    /// Put a booking back to `status` if nobody wrote it since `version`
    async fn restore_status(&self, booking_id: &str, version: u64, status: BookingStatus) {
        let result = self
            .repo
            .update_if_version::<Booking>(booking_id, version, status_fields(status))
            .await;
        if let Err(err) = result {
            log::error!("failed to restore booking {} to {}: {}", booking_id, status, err);
        }
    }

    /// Undo a half-written discharge: record dropped, freed bed taken back, booking Approved
    async fn undo_discharge(
        &self,
        booking: &Booking,
        version: u64,
        freed: bool,
        record: Option<&DischargeRecord>,
    ) {
        if let Some(record) = record {
            if let Err(err) = self.repo.delete::<DischargeRecord>(record.id()).await {
                log::error!("failed to drop discharge record {}: {}", record.id(), err);
            }
        }
        if freed {
            self.compensate_beds(&booking.hospital_id, booking.bed_type, -1).await;
        }
        self.restore_status(booking.id(), version, BookingStatus::Approved).await;
    }

    async fn release_ambulance(&self, ambulance_id: &str, version: u64) {
        let result = self
            .repo
            .update_if_version::<Ambulance>(ambulance_id, version, fields(json!({ "is_available": true })))
            .await;
        if let Err(err) = result {
            log::error!("failed to release ambulance {}: {}", ambulance_id, err);
        }
    }

    async fn audit(&self, entry: &AuditEntry) -> WorkflowResult<AuditEntry> {
        Ok(self.repo.create(entry).await?)
    }

    // === Admin actions ===

    /// Approve a pending booking
    pub async fn approve(&self, booking_id: &str) -> WorkflowResult<Booking> {
        let actor = self.current_user().await?;
        let booking: Booking = self.repo.get(booking_id).await?;
        let now = Utc::now();
        let policy = self.config.over_commit;

        let (_, transition) = self
            .update_beds(&booking.hospital_id, |hospital| {
                let t = workflow::approve(&booking, hospital, &actor.email, policy, now)?;
                Ok((t.hospital.clone(), t))
            })
            .await?;
        let Transition { audit, hospital, .. } = transition;

        let version = match self
            .repo
            .update_if_version::<Booking>(booking.id(), booking.version(), status_fields(BookingStatus::Approved))
            .await
        {
            Ok(version) => version,
            Err(err) => {
                if hospital.is_some() {
                    self.compensate_beds(&booking.hospital_id, booking.bed_type, 1).await;
                }
                return Err(err.into());
            }
        };

        if let Err(err) = self.audit(&audit).await {
            self.restore_status(booking.id(), version, BookingStatus::Pending).await;
            if hospital.is_some() {
                self.compensate_beds(&booking.hospital_id, booking.bed_type, 1).await;
            }
            return Err(err);
        }

        log::info!(
            "approved {} booking {} for {}",
            booking.bed_type,
            booking.id(),
            booking.patient_name
        );
        Ok(self.repo.get(booking_id).await?)
    }

    /// Reject a pending booking
    pub async fn reject(&self, booking_id: &str) -> WorkflowResult<Booking> {
        let actor = self.current_user().await?;
        let booking: Booking = self.repo.get(booking_id).await?;
        let transition = workflow::reject(&booking, &actor.email, Utc::now())?;

        self.repo
            .update_if_version::<Booking>(booking.id(), booking.version(), status_fields(BookingStatus::Rejected))
            .await?;
        self.audit(&transition.audit).await?;

        log::info!("rejected booking {} for {}", booking.id(), booking.patient_name);
        Ok(self.repo.get(booking_id).await?)
    }

    /// Discharge an admitted patient and free their bed
    pub async fn discharge(&self, booking_id: &str) -> WorkflowResult<DischargeRecord> {
        let actor = self.current_user().await?;
        let booking: Booking = self.repo.get(booking_id).await?;
        let hospital: Hospital = self.repo.get(&booking.hospital_id).await?;
        let now = Utc::now();

        // Validates the transition before anything is written
        let transition = workflow::discharge(&booking, &hospital, &actor.email, now)?;

        let version = self
            .repo
            .update_if_version::<Booking>(booking.id(), booking.version(), status_fields(BookingStatus::Discharged))
            .await?;

        // A full category clamps the increment; only a moved count is taken back
        let freed = match self
            .update_beds(&booking.hospital_id, |current| {
                let next = apply_bed_delta(current, booking.bed_type, 1);
                let moved = next.beds_of(booking.bed_type) != current.beds_of(booking.bed_type);
                Ok((Some(next), moved))
            })
            .await
        {
            Ok((_, moved)) => moved,
            Err(err) => {
                self.restore_status(booking.id(), version, BookingStatus::Approved).await;
                return Err(err);
            }
        };

        let record = match self.repo.create(&transition.record).await {
            Ok(record) => record,
            Err(err) => {
                self.undo_discharge(&booking, version, freed, None).await;
                return Err(err.into());
            }
        };
        if let Err(err) = self.audit(&transition.audit).await {
            self.undo_discharge(&booking, version, freed, Some(&record)).await;
            return Err(err);
        }

        log::info!(
            "discharged {} from {} bed at {}",
            booking.patient_name,
            booking.bed_type,
            hospital.name
        );
        Ok(record)
    }

    /// Replace every bed count of a hospital
    pub async fn set_bed_counts(&self, hospital_id: &str, counts: BedCounts) -> WorkflowResult<Hospital> {
        let actor = self.current_user().await?;
        let (hospital, _) = self
            .update_beds(hospital_id, |current| Ok((Some(set_bed_counts(current, counts)), ())))
            .await?;

        let entry = AuditEntry::new(
            actor.email,
            AuditAction::BedUpdate,
            bed_update_details(&hospital.beds),
            hospital_id,
            Utc::now(),
        )
        .related_to(hospital_id);
        self.audit(&entry).await?;

        log::info!("bed counts of {} updated", hospital.name);
        Ok(hospital)
    }

    // === Patient actions ===

    /// Request a bed at a hospital
    pub async fn create_booking(&self, hospital_id: &str, form: &BookingForm) -> WorkflowResult<Booking> {
        let patient = self.current_user().await?;
        let hospital: Hospital = self.repo.get(hospital_id).await?;
        if !hospital.is_active {
            return Err(WorkflowError::validation(
                "hospital_id",
                format!("{} is not accepting bookings", hospital.name),
            ));
        }

        let booking = workflow::create_booking(form, &patient, &hospital, self.location.location())?;
        let booking = self.repo.create(&booking).await?;

        if self.config.audit_patient_actions {
            self.audit(&workflow::booking_created_audit(&booking, Utc::now())).await?;
        }
        log::info!(
            "{} requested a {} bed at {}",
            booking.patient_name,
            booking.bed_type,
            hospital.name
        );
        Ok(booking)
    }

    /// Dispatch an ambulance to the patient's current location
    pub async fn book_ambulance(&self, ambulance_id: &str) -> WorkflowResult<AmbulanceBooking> {
        let patient = self.current_user().await?;
        let pickup = self.location.location().ok_or_else(|| {
            WorkflowError::validation("location", "pickup location is unknown; enable location or pick a city")
        })?;
        let ambulance: Ambulance = self.repo.get(ambulance_id).await?;
        let destination = match ambulance.hospital_id.as_deref() {
            Some(id) if !id.is_empty() => self.repo.find::<Hospital>(id).await?,
            _ => None,
        };

        let dispatch = workflow::book_ambulance(&ambulance, &patient, pickup, destination.as_ref())?;

        // Claim the vehicle before writing the booking
        let claimed = match self
            .repo
            .update_if_version::<Ambulance>(
                ambulance.id(),
                ambulance.version(),
                fields(json!({ "is_available": false })),
            )
            .await
        {
            Ok(version) => version,
            Err(StoreError::VersionConflict { .. }) => {
                let latest: Ambulance = self.repo.get(ambulance_id).await?;
                return Err(if latest.is_available {
                    WorkflowError::conflict(EntityKind::Ambulance, ambulance_id)
                } else {
                    WorkflowError::Unavailable(Unavailable::Ambulance {
                        vehicle_number: latest.vehicle_number,
                    })
                });
            }
            Err(err) => return Err(err.into()),
        };

        let booking = match self.repo.create(&dispatch.booking).await {
            Ok(booking) => booking,
            Err(err) => {
                self.release_ambulance(ambulance_id, claimed).await;
                return Err(err.into());
            }
        };
        if self.config.audit_patient_actions {
            if let Err(err) = self.audit(&workflow::ambulance_booked_audit(&booking, Utc::now())).await {
                if let Err(undo) = self.repo.delete::<AmbulanceBooking>(booking.id()).await {
                    log::error!("could not withdraw ambulance booking {}: {}", booking.id(), undo);
                }
                self.release_ambulance(ambulance_id, claimed).await;
                return Err(err);
            }
        }
        log::info!(
            "ambulance {} dispatched to {}, eta {} min",
            booking.vehicle_number,
            booking.patient_name,
            booking.estimated_eta_minutes
        );
        Ok(booking)
    }

    // === Queries ===

    pub async fn hospital(&self, id: &str) -> WorkflowResult<Hospital> {
        Ok(self.repo.get(id).await?)
    }

    pub async fn hospitals(&self) -> WorkflowResult<Vec<Hospital>> {
        Ok(self.repo.list().await?)
    }

    pub async fn active_hospitals(&self) -> WorkflowResult<Vec<Hospital>> {
        Ok(self.repo.filter(&Filter::all().where_eq("is_active", true), None).await?)
    }

    /// Active hospitals of one city
    pub async fn hospitals_in_city(&self, city: &str) -> WorkflowResult<Vec<Hospital>> {
        let filter = Filter::all()
            .where_eq("city", city)
            .where_eq("is_active", true);
        Ok(self.repo.filter(&filter, None).await?)
    }

    pub async fn ambulances(&self) -> WorkflowResult<Vec<Ambulance>> {
        Ok(self.repo.list().await?)
    }

    /// All bookings of a hospital, newest first
    pub async fn hospital_bookings(&self, hospital_id: &str) -> WorkflowResult<Vec<Booking>> {
        Ok(self
            .repo
            .filter(
                &Filter::all().where_eq("hospital_id", hospital_id),
                Some(&SortSpec::desc("created_date")),
            )
            .await?)
    }

    pub async fn bookings_with_status(
        &self,
        hospital_id: &str,
        status: BookingStatus,
    ) -> WorkflowResult<Vec<Booking>> {
        Ok(self
            .repo
            .filter(
                &Filter::all()
                    .where_eq("hospital_id", hospital_id)
                    .where_eq("status", status.as_str()),
                Some(&SortSpec::desc("created_date")),
            )
            .await?)
    }

    /// Patients currently occupying a bed
    pub async fn admitted_patients(&self, hospital_id: &str) -> WorkflowResult<Vec<Booking>> {
        self.bookings_with_status(hospital_id, BookingStatus::Approved).await
    }

    /// The signed-in patient's bookings, newest first
    pub async fn my_bookings(&self) -> WorkflowResult<Vec<Booking>> {
        let user = self.current_user().await?;
        Ok(self
            .repo
            .filter(
                &Filter::all().where_eq("patient_email", user.email),
                Some(&SortSpec::desc("created_date")),
            )
            .await?)
    }

    pub async fn my_ambulance_bookings(&self) -> WorkflowResult<Vec<AmbulanceBooking>> {
        let user = self.current_user().await?;
        Ok(self
            .repo
            .filter(
                &Filter::all().where_eq("patient_email", user.email),
                Some(&SortSpec::desc("created_date")),
            )
            .await?)
    }

    pub async fn discharges(&self, hospital_id: &str) -> WorkflowResult<Vec<DischargeRecord>> {
        Ok(self
            .repo
            .filter(
                &Filter::all().where_eq("hospital_id", hospital_id),
                Some(&SortSpec::desc("discharged_date")),
            )
            .await?)
    }

    /// Ambulance trips bound for a hospital
    pub async fn inbound_ambulances(&self, hospital_id: &str) -> WorkflowResult<Vec<AmbulanceBooking>> {
        Ok(self
            .repo
            .filter(&Filter::all().where_eq("destination_hospital_id", hospital_id), None)
            .await?)
    }

    /// Audit trail of a hospital, newest first
    pub async fn audit_log(&self, hospital_id: &str) -> WorkflowResult<Vec<AuditEntry>> {
        Ok(self
            .repo
            .filter(
                &Filter::all().where_eq("hospital_id", hospital_id),
                Some(&SortSpec::desc("timestamp")),
            )
            .await?)
    }

    /// Dashboard figures for one hospital as of today (UTC)
    pub async fn analytics(&self, hospital_id: &str) -> WorkflowResult<HospitalAnalytics> {
        let hospital = self.hospital(hospital_id).await?;
        let bookings = self.hospital_bookings(hospital_id).await?;
        let discharges = self.discharges(hospital_id).await?;
        let trips = self.inbound_ambulances(hospital_id).await?;
        Ok(hospital_analytics(
            &hospital,
            &bookings,
            &discharges,
            &trips,
            Utc::now().date_naive(),
        ))
    }
}
