use super::{PatientId, User, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub user_id: UserId,
    pub age: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialty {
    Radiology,
    Pathology,
    Cardiology,
}

impl Specialty {
    pub fn as_str(self) -> &'static str {
        match self {
            Specialty::Radiology => "radiology",
            Specialty::Pathology => "pathology",
            Specialty::Cardiology => "cardiology",
        }
    }
}

impl std::fmt::Display for Specialty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "radiology" => Ok(Specialty::Radiology),
            "pathology" => Ok(Specialty::Pathology),
            "cardiology" => Ok(Specialty::Cardiology),
            other => Err(format!("unknown specialty {other:?}")),
        }
    }
}

/// Doctor profile. Keyed by the owning user's id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Doctor {
    pub user_id: UserId,
    pub specialty: Specialty,
    pub license_number: String,
    pub years_experience: u32,
}

/// A doctor profile together with its account, as returned by doctor listings.
#[derive(Clone, Debug)]
pub struct DoctorProfile {
    pub doctor: Doctor,
    pub user: User,
}
