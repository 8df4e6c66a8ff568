//! Bed booking commands

use super::session::{Session, diagnose};
use anyhow::{Result, bail};
use medibed_engine::WorkflowAction;
use medibed_types::{BookingForm, BookingStatus};

/// Request a bed at `hospital_id` as the acting patient
pub async fn book(session: &Session, hospital_id: &str, form: &BookingForm) -> Result<()> {
    let booking = session
        .service()
        .create_booking(hospital_id, form)
        .await
        .map_err(diagnose)?;
    session.save()?;
    session.print(&booking)
}

/// Approve or reject a pending booking as the acting admin
pub async fn decide(session: &Session, action: WorkflowAction, booking_id: &str) -> Result<()> {
    let service = session.service();
    let booking = match action {
        WorkflowAction::Approve => service.approve(booking_id).await,
        WorkflowAction::Reject => service.reject(booking_id).await,
        WorkflowAction::Discharge => return discharge(session, booking_id).await,
    }
    .map_err(diagnose)?;
    session.save()?;
    session.print(&booking)
}

pub async fn discharge(session: &Session, booking_id: &str) -> Result<()> {
    let record = session
        .service()
        .discharge(booking_id)
        .await
        .map_err(diagnose)?;
    session.save()?;
    session.print(&record)
}

/// A hospital's bookings, or the acting patient's own when no hospital is given
pub async fn list(
    session: &Session,
    hospital_id: Option<&str>,
    status: Option<BookingStatus>,
) -> Result<()> {
    let service = session.service();
    let bookings = match (hospital_id, status) {
        (Some(id), Some(status)) => service.bookings_with_status(id, status).await,
        (Some(id), None) => service.hospital_bookings(id).await,
        (None, None) => service.my_bookings().await,
        (None, Some(_)) => bail!("--status needs --hospital"),
    }
    .map_err(diagnose)?;
    session.print(&bookings)
}

pub async fn discharges(session: &Session, hospital_id: &str) -> Result<()> {
    let records = session
        .service()
        .discharges(hospital_id)
        .await
        .map_err(diagnose)?;
    session.print(&records)
}
