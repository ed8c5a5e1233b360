#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gardes::{
    config::{export_config_json, load_config_from_file, AllocConfig},
    io,
    model::{DoctorId, RequestKind},
    month_days,
    storage::{JsonStorage, Storage},
    Allocator, RunStatistics, YearMonth,
};
use serde::Deserialize;
use std::collections::BTreeMap;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de répartition des gardes (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du roster (médecins + demandes)
    #[arg(long, global = true, default_value = "roster.json")]
    roster: String,

    /// Configuration JSON des paliers (défaut : HO1/HO2/HO3 intégrés)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des médecins depuis un CSV
    ImportDoctors {
        #[arg(long)]
        csv: String,
    },

    /// Importer des demandes (AL/CB/CR) depuis un CSV
    ImportRequests {
        #[arg(long)]
        csv: String,
        /// Remplace toutes les demandes existantes
        #[arg(long)]
        replace: bool,
    },

    /// Poser ou retirer une demande
    Request {
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        day: u32,
        /// AL, CB ou CR ; absent = retrait
        #[arg(long)]
        kind: Option<String>,
    },

    /// Afficher les jours d'un mois
    Calendar {
        #[arg(long)]
        year: i32,
        /// 1..=12
        #[arg(long)]
        month: u32,
    },

    /// Générer l'allocation d'un mois
    Allocate {
        #[arg(long)]
        year: i32,
        /// 1..=12
        #[arg(long)]
        month: u32,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Reporter les points d'un résultat dans les points cumulés
    ApplyPoints {
        #[arg(long)]
        result: String,
    },

    /// Écrire la configuration effective en JSON
    ExportConfig {
        #[arg(long)]
        out: String,
    },
}

#[derive(Deserialize)]
struct SavedPoints {
    call_points: BTreeMap<DoctorId, f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let config = match &cli.config {
        Some(path) => load_config_from_file(path)?,
        None => AllocConfig::default(),
    };
    let storage = JsonStorage::open(&cli.roster)?;
    let mut roster = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::ImportDoctors { csv } => {
            let doctors = io::import_doctors_csv(csv)?;
            println!("{} doctor(s) imported", doctors.len());
            roster.upsert_doctors(doctors);
            storage.save(&roster)?;
            0
        }
        Commands::ImportRequests { csv, replace } => {
            let requests = io::import_requests_csv(csv)?;
            if replace {
                roster.requests.clear();
            }
            let mut count = 0usize;
            for (doctor, day, kind) in requests.iter() {
                if roster.find_doctor_by_id(doctor).is_none() {
                    eprintln!("Warning: unknown doctor {doctor}, request ignored");
                    continue;
                }
                roster.requests.insert(doctor.clone(), day, kind);
                count += 1;
            }
            println!("{count} request(s) imported");
            storage.save(&roster)?;
            0
        }
        Commands::Request { doctor, day, kind } => {
            let id = DoctorId::new(&doctor);
            if roster.find_doctor_by_id(&id).is_none() {
                bail!("unknown doctor: {doctor}");
            }
            match kind {
                Some(kind) => {
                    let kind: RequestKind = kind.parse()?;
                    roster.requests.insert(id, day, kind);
                }
                None => {
                    roster.requests.remove(&id, day);
                }
            }
            storage.save(&roster)?;
            0
        }
        Commands::Calendar { year, month } => {
            let month = parse_month(year, month)?;
            for day in month_days(month, &config.holidays) {
                println!(
                    "{} {:?}{}{}",
                    day.full_date,
                    day.kind,
                    if day.is_weekend { " weekend" } else { "" },
                    day.holiday
                        .as_deref()
                        .map(|h| format!(" ({h})"))
                        .unwrap_or_default()
                );
            }
            0
        }
        Commands::Allocate {
            year,
            month,
            out_json,
            out_csv,
        } => {
            let month = parse_month(year, month)?;
            if roster.doctors.is_empty() {
                bail!("no doctors in roster {}", storage.path().display());
            }
            let allocator = Allocator::new(&config)?;
            let result = allocator.allocate(&roster.doctors, &roster.requests, month)?;

            if let Some(path) = out_json {
                io::export_result_json(path, &result)?;
            }
            if let Some(path) = out_csv {
                io::export_allocation_csv(path, &roster.doctors, &result)?;
            }
            print!("{}", io::render_allocation_table(&roster.doctors, &result));

            let stats = RunStatistics::compute(&roster.doctors, &result);
            let totals: Vec<String> = stats
                .total_calls
                .iter()
                .map(|(tier, n)| format!("{tier}={n}"))
                .collect();
            println!(
                "avg {:.1} pts | spread {:.1} | calls {}",
                stats.average_points,
                stats.spread(),
                totals.join(" ")
            );

            for shift in &result.unfilled {
                eprintln!("Unfilled: day {} {}", shift.day, shift.tier);
            }
            let shortfalls = result.staffing.shortfalls();
            if shortfalls.is_empty() && result.unfilled.is_empty() {
                println!("OK: staffing sufficient");
                0
            } else {
                for s in &shortfalls {
                    eprintln!(
                        "Understaffed: day {} {} {}/{}",
                        s.day, s.team, s.count, s.minimum
                    );
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::ApplyPoints { result } => {
            let data = std::fs::read(&result).with_context(|| format!("reading {result}"))?;
            let saved: SavedPoints =
                serde_json::from_slice(&data).with_context(|| format!("parsing {result}"))?;
            let unknown = roster.apply_call_points(&saved.call_points);
            for id in &unknown {
                eprintln!("Warning: unknown doctor {id}, points ignored");
            }
            storage.save(&roster)?;
            println!(
                "Points applied to {} doctor(s)",
                saved.call_points.len() - unknown.len()
            );
            0
        }
        Commands::ExportConfig { out } => {
            export_config_json(out, &config)?;
            0
        }
    };

    std::process::exit(code);
}

fn parse_month(year: i32, month: u32) -> Result<YearMonth> {
    if !(1..=12).contains(&month) {
        bail!("month must be in 1..=12, got {month}");
    }
    Ok(YearMonth::new(year, month - 1)?)
}
