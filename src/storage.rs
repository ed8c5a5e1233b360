//! Persistance du roster entre deux runs.
//!
//! Le fichier JSON contient :
//! - `doctors` : les médecins dans l'ordre du roster (cet ordre départage les égalités de points),
//!   avec leurs `cumulative_points` déjà reportés par `apply-points` ;
//! - `requests` : `{ doctor_id: { jour: "AL" | "CB" | "CR" } }`, absent si aucune demande.
//!
//! Les allocations elles-mêmes ne sont pas stockées ici, seulement exportées (voir `io`).

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tempfile::NamedTempFile;

use crate::model::Roster;

pub trait Storage {
    fn load(&self) -> anyhow::Result<Roster>;
    /// Remplace le roster stocké ; un échec laisse l'ancien intact.
    fn save(&self, roster: &Roster) -> anyhow::Result<()>;
}

/// Roster dans un fichier JSON unique.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.is_dir() {
            bail!("roster path {} is a directory", path.display());
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Roster vide tant qu'aucun import n'a créé le fichier.
    pub fn load_or_default(&self) -> anyhow::Result<Roster> {
        match fs::read(&self.path) {
            Ok(data) => self.decode(&data),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Roster::default()),
            Err(e) => {
                Err(e).with_context(|| format!("reading roster {}", self.path.display()))
            }
        }
    }

    fn decode(&self, data: &[u8]) -> anyhow::Result<Roster> {
        serde_json::from_slice(data)
            .with_context(|| format!("parsing roster {}", self.path.display()))
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Roster> {
        let data = fs::read(&self.path)
            .with_context(|| format!("reading roster {}", self.path.display()))?;
        self.decode(&data)
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(roster)
            .with_context(|| format!("encoding roster for {}", self.path.display()))?;
        write_atomic(&self.path, &json)
    }
}

/// Écrit dans un fichier temporaire du même dossier puis renomme.
fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file next to {}", path.display()))?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
