//! Patient and doctor profiles.
//!
//! A user owns at most one profile, and only the kind matching their role. Deleting a patient
//! profile removes everything raised under it; deleting a doctor profile unassigns their issues.

use crate::access::{self, Actor};
use crate::constants::MAX_LICENSE_NUMBER_LEN;
use crate::error::{CoreError, CoreResult};
use crate::model::{Doctor, DoctorProfile, Patient, PatientId, Role, Specialty, UserId};
use crate::repositories::accounts::NewDoctorProfile;
use crate::store::{Store, Tables};
use std::sync::Arc;
use yaqeen_types::NonEmptyText;

/// Partial update of a doctor profile; `None` leaves a field unchanged.
#[derive(Clone, Debug, Default)]
pub struct DoctorUpdate {
    pub specialty: Option<Specialty>,
    pub license_number: Option<String>,
    pub years_experience: Option<u32>,
}

fn ensure_no_profile(tables: &Tables, user_id: UserId) -> CoreResult<()> {
    if tables.patient_for_user(user_id).is_some() || tables.doctors.contains_key(&user_id) {
        return Err(CoreError::Conflict(format!(
            "user {user_id} already has a profile"
        )));
    }
    Ok(())
}

fn normalise_license(tables: &Tables, raw: &str, owner: UserId) -> CoreResult<String> {
    let license = NonEmptyText::bounded(raw, MAX_LICENSE_NUMBER_LEN)
        .map_err(|e| CoreError::invalid("license_number", e))?
        .into_string();
    let taken = tables
        .doctors
        .values()
        .any(|d| d.license_number == license && d.user_id != owner);
    if taken {
        return Err(CoreError::Conflict(format!(
            "license number {license:?} is already registered"
        )));
    }
    Ok(license)
}

pub(crate) fn insert_patient_profile(
    tables: &mut Tables,
    user_id: UserId,
    age: u32,
) -> CoreResult<Patient> {
    ensure_no_profile(tables, user_id)?;
    let id = tables.next_patient_id();
    let patient = Patient { id, user_id, age };
    tables.patients.insert(id, patient.clone());
    Ok(patient)
}

pub(crate) fn insert_doctor_profile(
    tables: &mut Tables,
    user_id: UserId,
    profile: NewDoctorProfile,
) -> CoreResult<Doctor> {
    ensure_no_profile(tables, user_id)?;
    let license_number = normalise_license(tables, &profile.license_number, user_id)?;
    let doctor = Doctor {
        user_id,
        specialty: profile.specialty,
        license_number,
        years_experience: profile.years_experience,
    };
    tables.doctors.insert(user_id, doctor.clone());
    Ok(doctor)
}

fn doctor_profile(tables: &Tables, doctor: &Doctor) -> CoreResult<DoctorProfile> {
    Ok(DoctorProfile {
        doctor: doctor.clone(),
        user: tables.user(doctor.user_id)?.clone(),
    })
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<Store>,
}

impl ProfileService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Patients visible to the caller: their own profile, or all of them for doctors.
    pub fn list_patients(&self, actor: &Actor) -> CoreResult<Vec<Patient>> {
        self.store.read(|tables| {
            Ok(tables
                .patients()
                .filter(|p| access::can_view_patient(actor, p))
                .cloned()
                .collect())
        })
    }

    pub fn get_patient(&self, actor: &Actor, id: PatientId) -> CoreResult<Patient> {
        self.store
            .read(|tables| access::visible_patient(actor, tables, id).cloned())
    }

    /// Create the caller's own patient profile.
    pub fn create_patient(&self, actor: &Actor, age: u32) -> CoreResult<Patient> {
        if actor.role != Role::Patient {
            return Err(CoreError::forbidden("only patient accounts can hold a patient profile"));
        }
        let patient = self
            .store
            .write(|tables| insert_patient_profile(tables, actor.user_id, age))?;
        tracing::info!(patient_id = %patient.id, "created patient profile");
        Ok(patient)
    }

    pub fn update_patient(&self, actor: &Actor, id: PatientId, age: u32) -> CoreResult<Patient> {
        self.store.write(|tables| {
            let patient = access::visible_patient(actor, tables, id)?;
            if patient.user_id != actor.user_id {
                return Err(CoreError::forbidden("only the owner may edit this profile"));
            }
            let patient = tables
                .patients
                .get_mut(&id)
                .ok_or_else(|| CoreError::not_found("patient", id))?;
            patient.age = age;
            Ok(patient.clone())
        })
    }

    /// Delete the caller's patient profile with its issues, attachments and requests.
    pub fn delete_patient(&self, actor: &Actor, id: PatientId) -> CoreResult<()> {
        self.store.write(|tables| {
            let patient = access::visible_patient(actor, tables, id)?;
            if patient.user_id != actor.user_id {
                return Err(CoreError::forbidden("only the owner may delete this profile"));
            }

            let issues: Vec<_> = tables
                .issues()
                .filter(|i| i.patient_id == id)
                .map(|i| i.id)
                .collect();
            for issue_id in issues {
                tables.remove_issue_cascade(issue_id);
            }
            tables.requests.retain(|_, r| r.patient_id != id);
            tables.patients.remove(&id);
            Ok(())
        })?;
        tracing::info!(patient_id = %id, "deleted patient profile");
        Ok(())
    }

    /// Doctors visible to the caller: all of them for patients, only themselves for doctors.
    pub fn list_doctors(&self, actor: &Actor) -> CoreResult<Vec<DoctorProfile>> {
        self.store.read(|tables| {
            tables
                .doctors()
                .filter(|d| access::can_view_doctor(actor, d))
                .map(|d| doctor_profile(tables, d))
                .collect()
        })
    }

    pub fn get_doctor(&self, actor: &Actor, id: UserId) -> CoreResult<DoctorProfile> {
        self.store.read(|tables| {
            let doctor = access::visible_doctor(actor, tables, id)?;
            doctor_profile(tables, doctor)
        })
    }

    /// Create the caller's own doctor profile.
    pub fn create_doctor(
        &self,
        actor: &Actor,
        profile: NewDoctorProfile,
    ) -> CoreResult<DoctorProfile> {
        if actor.role != Role::Doctor {
            return Err(CoreError::forbidden("only doctor accounts can hold a doctor profile"));
        }
        let created = self.store.write(|tables| {
            let doctor = insert_doctor_profile(tables, actor.user_id, profile)?;
            doctor_profile(tables, &doctor)
        })?;
        tracing::info!(doctor_id = %created.doctor.user_id, "created doctor profile");
        Ok(created)
    }

    pub fn update_doctor(
        &self,
        actor: &Actor,
        id: UserId,
        update: DoctorUpdate,
    ) -> CoreResult<DoctorProfile> {
        self.store.write(|tables| {
            let doctor = access::visible_doctor(actor, tables, id)?;
            if doctor.user_id != actor.user_id {
                return Err(CoreError::forbidden("only the owner may edit this profile"));
            }
            let license = update
                .license_number
                .as_deref()
                .map(|raw| normalise_license(tables, raw, id))
                .transpose()?;

            let doctor = tables
                .doctors
                .get_mut(&id)
                .ok_or_else(|| CoreError::not_found("doctor", id))?;
            if let Some(specialty) = update.specialty {
                doctor.specialty = specialty;
            }
            if let Some(license) = license {
                doctor.license_number = license;
            }
            if let Some(years) = update.years_experience {
                doctor.years_experience = years;
            }
            let doctor = doctor.clone();
            doctor_profile(tables, &doctor)
        })
    }

    /// Delete the caller's doctor profile; their issues become unassigned.
    pub fn delete_doctor(&self, actor: &Actor, id: UserId) -> CoreResult<()> {
        self.store.write(|tables| {
            let doctor = access::visible_doctor(actor, tables, id)?;
            if doctor.user_id != actor.user_id {
                return Err(CoreError::forbidden("only the owner may delete this profile"));
            }
            for issue in tables.issues.values_mut() {
                if issue.doctor == Some(id) {
                    issue.doctor = None;
                }
            }
            tables.doctors.remove(&id);
            Ok(())
        })?;
        tracing::info!(doctor_id = %id, "deleted doctor profile");
        Ok(())
    }
}
