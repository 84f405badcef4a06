use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use yaqeen_core::config::{data_file_from_env_value, password_iterations_from_env_value};
use yaqeen_core::constants::DEFAULT_TOKEN_TTL_SECS;
use yaqeen_core::model::{Role, Specialty};
use yaqeen_core::{
    CoreConfig, NewDoctorProfile, NewPatientProfile, NewProfile, RegisterUser, Services, Store,
};

#[derive(Parser)]
#[command(name = "yaqeen")]
#[command(about = "Yaqeen medical issue tracker CLI")]
struct Cli {
    /// JSON snapshot file (defaults to YAQEEN_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all users
    Users,
    /// List all patient profiles
    Patients,
    /// List all doctor profiles
    Doctors,
    /// List all issues
    Issues,
    /// List all patient requests
    Requests,
    /// Register a user
    Register {
        username: String,
        /// `patient` or `doctor`
        role: Role,
        password: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// Creates a patient profile
        #[arg(long)]
        age: Option<u32>,
        /// Creates a doctor profile together with --license-number
        #[arg(long)]
        specialty: Option<Specialty>,
        #[arg(long)]
        license_number: Option<String>,
        #[arg(long, default_value_t = 0)]
        years_experience: u32,
    },
    /// Deactivate an account and end its sessions
    Deactivate { username: String },
    /// Reactivate an account
    Activate { username: String },
}

fn open(data_file: Option<PathBuf>) -> Result<(Arc<Store>, Services), Box<dyn std::error::Error>> {
    let data_file = data_file
        .or_else(|| data_file_from_env_value(std::env::var("YAQEEN_DATA_FILE").ok()))
        .ok_or("no data file: pass --data-file or set YAQEEN_DATA_FILE")?;
    let iterations =
        password_iterations_from_env_value(std::env::var("YAQEEN_PASSWORD_ITERATIONS").ok())?;
    let cfg = CoreConfig::new(
        Some(data_file),
        chrono::Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        iterations,
    )?;
    let store = Arc::new(Store::open(&cfg)?);
    let services = Services::with_store(Arc::new(cfg), store.clone());
    Ok((store, services))
}

fn registration_profile(
    age: Option<u32>,
    specialty: Option<Specialty>,
    license_number: Option<String>,
    years_experience: u32,
) -> Result<Option<NewProfile>, String> {
    match (age, specialty, license_number) {
        (None, None, None) => Ok(None),
        (Some(age), None, None) => Ok(Some(NewProfile::Patient(NewPatientProfile { age }))),
        (None, Some(specialty), Some(license_number)) => {
            Ok(Some(NewProfile::Doctor(NewDoctorProfile {
                specialty,
                license_number,
                years_experience,
            })))
        }
        _ => Err("give either --age, or both --specialty and --license-number".into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("No command given. Use --help for usage.");
        return Ok(());
    };
    let (store, services) = open(cli.data_file)?;

    match command {
        Commands::Users => {
            let lines = store.read(|t| {
                Ok(t.users()
                    .map(|u| {
                        format!(
                            "ID: {}, Username: {}, Name: {}, Role: {}, Active: {}, Joined: {}",
                            u.id,
                            u.username,
                            u.full_name(),
                            u.role,
                            u.is_active,
                            u.date_joined.format("%Y-%m-%d")
                        )
                    })
                    .collect::<Vec<_>>())
            })?;
            print_or_empty(lines, "No users found.");
        }
        Commands::Patients => {
            let lines = store.read(|t| {
                Ok(t.patients()
                    .map(|p| {
                        let username = t.user(p.user_id).map(|u| u.username.as_str()).unwrap_or("?");
                        format!("ID: {}, User: {} ({}), Age: {}", p.id, username, p.user_id, p.age)
                    })
                    .collect::<Vec<_>>())
            })?;
            print_or_empty(lines, "No patients found.");
        }
        Commands::Doctors => {
            let lines = store.read(|t| {
                Ok(t.doctors()
                    .map(|d| {
                        let username = t.user(d.user_id).map(|u| u.username.as_str()).unwrap_or("?");
                        format!(
                            "ID: {}, User: {}, Specialty: {}, License: {}, Experience: {} years",
                            d.user_id, username, d.specialty, d.license_number, d.years_experience
                        )
                    })
                    .collect::<Vec<_>>())
            })?;
            print_or_empty(lines, "No doctors found.");
        }
        Commands::Issues => {
            let lines = store.read(|t| {
                Ok(t.issues()
                    .map(|i| {
                        let doctor = i.doctor.map_or("unassigned".to_string(), |d| d.to_string());
                        format!(
                            "ID: {}, Patient: {}, Doctor: {}, Status: {}, Title: {}",
                            i.id, i.patient_id, doctor, i.status, i.title
                        )
                    })
                    .collect::<Vec<_>>())
            })?;
            print_or_empty(lines, "No issues found.");
        }
        Commands::Requests => {
            let lines = store.read(|t| {
                Ok(t.requests()
                    .map(|r| {
                        let specialty = r.specialty.map_or("any", Specialty::as_str);
                        format!(
                            "ID: {}, Patient: {}, Specialty: {}, Status: {}, Title: {}",
                            r.id, r.patient_id, specialty, r.status, r.title
                        )
                    })
                    .collect::<Vec<_>>())
            })?;
            print_or_empty(lines, "No patient requests found.");
        }
        Commands::Register {
            username,
            role,
            password,
            email,
            first_name,
            last_name,
            age,
            specialty,
            license_number,
            years_experience,
        } => {
            let profile = registration_profile(age, specialty, license_number, years_experience)?;
            let user = services.accounts.register(RegisterUser {
                username,
                password,
                email,
                first_name,
                last_name,
                role,
                profile_picture: None,
                profile,
            })?;
            println!("Registered {} with ID: {}", user.display_name(), user.id);
        }
        Commands::Deactivate { username } => {
            let user = services.accounts.set_active(&username, false)?;
            println!("Deactivated {}", user.username);
        }
        Commands::Activate { username } => {
            let user = services.accounts.set_active(&username, true)?;
            println!("Activated {}", user.username);
        }
    }

    Ok(())
}

fn print_or_empty(lines: Vec<String>, empty: &str) {
    if lines.is_empty() {
        println!("{empty}");
    }
    for line in lines {
        println!("{line}");
    }
}
