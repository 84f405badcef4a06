use crate::convert;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;
use api_shared::{CreateDoctorReq, DoctorRes, PatientReq, PatientRes, UpdateDoctorReq};
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Json;
use yaqeen_core::model::{PatientId, Specialty, UserId};
use yaqeen_core::{Actor, DoctorUpdate, NewDoctorProfile};

fn specialty(raw: &str) -> Result<Specialty, ApiError> {
    raw.parse().map_err(ApiError::BadRequest)
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "Patients visible to the caller", body = [PatientRes])
    )
)]
/// List patients: a patient sees only themselves, a doctor sees everyone.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<PatientRes>>, ApiError> {
    let patients = state.services.profiles.list_patients(&actor)?;
    Ok(Json(patients.iter().map(convert::patient).collect()))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientReq,
    responses(
        (status = 201, description = "Patient profile created", body = PatientRes),
        (status = 403, description = "Caller is not a patient", body = api_shared::ErrorBody),
        (status = 409, description = "Caller already has a profile", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<PatientReq>,
) -> Result<(StatusCode, Json<PatientRes>), ApiError> {
    let patient = state.services.profiles.create_patient(&actor, req.age)?;
    Ok((StatusCode::CREATED, Json(convert::patient(&patient))))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient profile", body = PatientRes),
        (status = 404, description = "Not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<PatientRes>, ApiError> {
    let patient = state.services.profiles.get_patient(&actor, PatientId(id))?;
    Ok(Json(convert::patient(&patient)))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    request_body = PatientReq,
    responses(
        (status = 200, description = "Patient profile updated", body = PatientRes),
        (status = 403, description = "Not the caller's profile", body = api_shared::ErrorBody),
        (status = 404, description = "Not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(req): ApiJson<PatientReq>,
) -> Result<Json<PatientRes>, ApiError> {
    let patient = state
        .services
        .profiles
        .update_patient(&actor, PatientId(id), req.age)?;
    Ok(Json(convert::patient(&patient)))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    responses(
        (status = 204, description = "Patient profile and everything raised under it removed"),
        (status = 403, description = "Not the caller's profile", body = api_shared::ErrorBody),
        (status = 404, description = "Not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    state.services.profiles.delete_patient(&actor, PatientId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/doctors",
    responses(
        (status = 200, description = "Doctors visible to the caller", body = [DoctorRes])
    )
)]
/// List doctors: a patient sees every doctor, a doctor sees only themselves.
#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<DoctorRes>>, ApiError> {
    let doctors = state.services.profiles.list_doctors(&actor)?;
    Ok(Json(doctors.iter().map(convert::doctor).collect()))
}

#[utoipa::path(
    post,
    path = "/doctors",
    request_body = CreateDoctorReq,
    responses(
        (status = 201, description = "Doctor profile created", body = DoctorRes),
        (status = 403, description = "Caller is not a doctor", body = api_shared::ErrorBody),
        (status = 409, description = "Profile exists or licence number taken", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<CreateDoctorReq>,
) -> Result<(StatusCode, Json<DoctorRes>), ApiError> {
    let profile = NewDoctorProfile {
        specialty: specialty(&req.specialty)?,
        license_number: req.license_number,
        years_experience: req.years_experience,
    };
    let doctor = state.services.profiles.create_doctor(&actor, profile)?;
    Ok((StatusCode::CREATED, Json(convert::doctor(&doctor))))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}",
    params(("id" = u64, Path, description = "Doctor's user id")),
    responses(
        (status = 200, description = "Doctor profile", body = DoctorRes),
        (status = 404, description = "Not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<DoctorRes>, ApiError> {
    let doctor = state.services.profiles.get_doctor(&actor, UserId(id))?;
    Ok(Json(convert::doctor(&doctor)))
}

#[utoipa::path(
    put,
    path = "/doctors/{id}",
    params(("id" = u64, Path, description = "Doctor's user id")),
    request_body = UpdateDoctorReq,
    responses(
        (status = 200, description = "Doctor profile updated", body = DoctorRes),
        (status = 404, description = "Not found", body = api_shared::ErrorBody),
        (status = 409, description = "Licence number taken", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(req): ApiJson<UpdateDoctorReq>,
) -> Result<Json<DoctorRes>, ApiError> {
    let update = DoctorUpdate {
        specialty: req.specialty.as_deref().map(specialty).transpose()?,
        license_number: req.license_number,
        years_experience: req.years_experience,
    };
    let doctor = state
        .services
        .profiles
        .update_doctor(&actor, UserId(id), update)?;
    Ok(Json(convert::doctor(&doctor)))
}

#[utoipa::path(
    delete,
    path = "/doctors/{id}",
    params(("id" = u64, Path, description = "Doctor's user id")),
    responses(
        (status = 204, description = "Doctor profile removed and their issues unassigned"),
        (status = 404, description = "Not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    state.services.profiles.delete_doctor(&actor, UserId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
