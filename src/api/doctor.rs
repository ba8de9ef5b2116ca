use actix_web::{HttpResponse, web};

use crate::{
    auth::{auth::Session, gate::Operation},
    billing::{DoctorFees, doctor_fees},
    error::{AppError, AppResult},
    repository::BillingStore,
};

#[utoipa::path(
    get,
    path = "/get_doctor_details/{staff_id}",
    params(("staff_id", Path, description = "Staff emp_id")),
    responses(
        (status = 200, description = "Facility fee percentage and GST", body = DoctorFees),
        (status = 404, description = "Doctor not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoicing"
)]
pub async fn get_doctor_details(
    session: Session,
    store: web::Data<dyn BillingStore>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ViewDoctorDetails)?;

    let doctor = store
        .get_staff(path.into_inner())
        .await?
        .ok_or(AppError::NotFound("Doctor"))?;

    Ok(HttpResponse::Ok().json(doctor_fees(doctor.facility_fees_percent)))
}
