use crate::allocator::AllocationResult;
use crate::model::{Doctor, DoctorId, RequestKind, RequestSet, Team};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Import de médecins depuis CSV: header `id,name,team[,cumulative_points]`
/// (id vide → identifiant aléatoire).
pub fn import_doctors_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Doctor>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        let team = rec.get(2).context("missing team")?.trim();
        if name.is_empty() {
            bail!("invalid doctor row (empty name)");
        }
        let team: Team = team
            .parse()
            .with_context(|| format!("invalid team for doctor {name}"))?;
        let cumulative_points = match rec.get(3).map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_points(raw)
                .with_context(|| format!("invalid cumulative_points for doctor {name}"))?,
            _ => 0.0,
        };
        let id = if id.is_empty() {
            DoctorId::random()
        } else {
            DoctorId::new(id)
        };
        out.push(Doctor {
            id,
            name: name.to_string(),
            team,
            cumulative_points,
        });
    }
    Ok(out)
}

fn parse_points(raw: &str) -> anyhow::Result<f64> {
    let value: f64 = raw.parse().context("expected a number")?;
    if !value.is_finite() || value < 0.0 {
        bail!("points must be a non-negative number");
    }
    Ok(value)
}

/// Import de demandes: header `doctor_id,day,kind` (kind ∈ AL, CB, CR).
/// Une demande ultérieure pour le même couple remplace la précédente.
pub fn import_requests_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<RequestSet> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = RequestSet::new();
    for rec in rdr.records() {
        let rec = rec?;
        let doctor = rec.get(0).context("missing doctor_id")?.trim();
        let day = rec.get(1).context("missing day")?.trim();
        let kind = rec.get(2).context("missing kind")?.trim();
        if doctor.is_empty() {
            bail!("invalid request row (empty doctor_id)");
        }
        let day: u32 = day
            .parse()
            .with_context(|| format!("invalid day for doctor {doctor}: {day}"))?;
        if !(1..=31).contains(&day) {
            bail!("day out of range for doctor {doctor}: {day}");
        }
        let kind: RequestKind = kind.parse()?;
        out.insert(DoctorId::new(doctor), day, kind);
    }
    Ok(out)
}

/// Export JSON du résultat (jolie mise en forme)
pub fn export_result_json<P: AsRef<Path>>(path: P, result: &AllocationResult) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(result)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV de la grille: header `doctor_id,name,team,1..N,run_points`
pub fn export_allocation_csv<P: AsRef<Path>>(
    path: P,
    doctors: &[Doctor],
    result: &AllocationResult,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    let days = result.allocation.days_in_month();

    let mut header: Vec<String> = vec!["doctor_id".into(), "name".into(), "team".into()];
    let mut buf = itoa::Buffer::new();
    header.extend((1..=days).map(|d| buf.format(d).to_string()));
    header.push("run_points".into());
    w.write_record(&header)?;

    for doctor in doctors {
        let mut row: Vec<String> = vec![
            doctor.id.as_str().to_string(),
            doctor.name.clone(),
            doctor.team.code().to_string(),
        ];
        row.extend((1..=days).map(|d| {
            result
                .allocation
                .get(&doctor.id, d)
                .map(|l| l.as_str().to_string())
                .unwrap_or_default()
        }));
        row.push(format!("{:.2}", result.points_for(&doctor.id)));
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

/// Rendu texte compact : une ligne par médecin, `-` pour une case vide.
pub fn render_allocation_table(doctors: &[Doctor], result: &AllocationResult) -> String {
    let days = result.allocation.days_in_month();
    let mut out = String::new();
    for doctor in doctors {
        let cells: Vec<&str> = (1..=days)
            .map(|d| {
                result
                    .allocation
                    .get(&doctor.id, d)
                    .map_or("-", |l| l.as_str())
            })
            .collect();
        let total = doctor.cumulative_points + result.points_for(&doctor.id);
        let _ = writeln!(
            out,
            "{} {} [{}] {} | {:.1} pts",
            doctor.id,
            doctor.name,
            doctor.team,
            cells.join(" "),
            total
        );
    }
    out
}
