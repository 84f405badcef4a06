use crate::convert;
use crate::error::ApiError;
use crate::extract::{ApiJson, BearerToken};
use crate::handlers::blocking;
use crate::AppState;
use api_shared::{LoginReq, RefreshReq, RegisterReq, RegisterRes, SessionRes, UserRes};
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Json;
use yaqeen_core::model::{Role, Specialty};
use yaqeen_core::{Actor, NewDoctorProfile, NewPatientProfile, NewProfile, RegisterUser};

/// Profile fields of a registration form, checked against the role.
fn registration_profile(role: Role, req: &RegisterReq) -> Result<Option<NewProfile>, ApiError> {
    let has_doctor_fields = req.specialty.is_some()
        || req.license_number.is_some()
        || req.years_experience.is_some();

    match role {
        Role::Patient => {
            if has_doctor_fields {
                return Err(ApiError::BadRequest(
                    "doctor profile fields given for a patient".into(),
                ));
            }
            Ok(req
                .age
                .map(|age| NewProfile::Patient(NewPatientProfile { age })))
        }
        Role::Doctor => {
            if req.age.is_some() {
                return Err(ApiError::BadRequest(
                    "patient profile fields given for a doctor".into(),
                ));
            }
            match (&req.specialty, &req.license_number) {
                (None, None) if req.years_experience.is_none() => Ok(None),
                (Some(specialty), Some(license)) => {
                    let specialty = specialty
                        .parse::<Specialty>()
                        .map_err(ApiError::BadRequest)?;
                    Ok(Some(NewProfile::Doctor(NewDoctorProfile {
                        specialty,
                        license_number: license.clone(),
                        years_experience: req.years_experience.unwrap_or_default(),
                    })))
                }
                _ => Err(ApiError::BadRequest(
                    "a doctor profile needs both specialty and license_number".into(),
                )),
            }
        }
    }
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered", body = RegisterRes),
        (status = 400, description = "Invalid registration", body = api_shared::ErrorBody),
        (status = 409, description = "Username or licence number taken", body = api_shared::ErrorBody)
    )
)]
/// Register a new patient or doctor, with their profile when its fields are supplied.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterReq>,
) -> Result<(StatusCode, Json<RegisterRes>), ApiError> {
    let role = req.role.parse::<Role>().map_err(ApiError::BadRequest)?;
    let profile = registration_profile(role, &req)?;
    let registration = RegisterUser {
        username: req.username,
        password: req.password,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        role,
        profile_picture: req.profile_picture,
        profile,
    };

    let accounts = state.services.accounts.clone();
    let user = blocking(move || accounts.register(registration)).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterRes {
            message: "User registered successfully!".into(),
            user: convert::user(&user),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Session opened", body = SessionRes),
        (status = 401, description = "Invalid credentials", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginReq>,
) -> Result<Json<SessionRes>, ApiError> {
    let accounts = state.services.accounts.clone();
    let session = blocking(move || accounts.login(&req.username, &req.password)).await?;
    Ok(Json(convert::session(&session)))
}

#[utoipa::path(
    post,
    path = "/users/token/refresh",
    request_body = RefreshReq,
    responses(
        (status = 200, description = "Token exchanged for a fresh one", body = SessionRes),
        (status = 401, description = "Token invalid or expired", body = api_shared::ErrorBody)
    )
)]
/// Exchange a live token for a new one; the old token stops working.
#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshReq>,
) -> Result<Json<SessionRes>, ApiError> {
    let session = state.services.accounts.refresh(&req.refresh)?;
    Ok(Json(convert::session(&session)))
}

#[utoipa::path(
    post,
    path = "/users/logout",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Authentication required", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> Result<StatusCode, ApiError> {
    state.services.accounts.logout(&token.0)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "The authenticated user", body = UserRes),
        (status = 401, description = "Authentication required", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UserRes>, ApiError> {
    let user = state.services.accounts.me(&actor)?;
    Ok(Json(convert::user(&user)))
}
