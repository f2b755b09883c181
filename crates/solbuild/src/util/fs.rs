use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};

/// Crée `dir` (et ses parents) ; sans effet s'il existe déjà.
pub fn ensure_dir(dir: &Utf8Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

pub fn ensure_parent(p: &Utf8Path) -> io::Result<()> {
    if let Some(dir) = p.parent() {
        ensure_dir(dir)?;
    }
    Ok(())
}

pub fn read_to_string(p: &Utf8Path) -> io::Result<String> {
    fs::read_to_string(p)
}

/// Écrase `p` s'il existe.
pub fn write_all(p: &Utf8Path, bytes: &[u8]) -> io::Result<()> {
    ensure_parent(p)?;
    fs::write(p, bytes)
}

/// Fichiers (non récursif) de `dir` dont le nom finit par `suffix`, triés par nom.
///
/// Les noms non UTF-8 ne peuvent pas finir par `suffix` : ils sont ignorés.
pub fn list_with_suffix(dir: &Utf8Path, suffix: &str) -> io::Result<Vec<Utf8PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.ends_with(suffix) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            continue;
        }
        out.push(dir.join(name));
    }
    out.sort();
    Ok(out)
}
