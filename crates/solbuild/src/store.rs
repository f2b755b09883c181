//! Écriture des artefacts : `<Unit>.abi.json` + `<Unit>.bin.txt` par unité.
//!
//! Un artefact existant est écrasé sans avertissement ; rejouer le build sur
//! des sources inchangées redonne des fichiers identiques octet pour octet.
//! Les noms d'unité viennent de solc et sont utilisés tels quels.

use camino::{Utf8Path, Utf8PathBuf};
use log::trace;

use crate::error::{BuildError, Result};
use crate::protocol::CompiledUnit;
use crate::util::fs;

pub const ABI_SUFFIX: &str = ".abi.json";
pub const BIN_SUFFIX: &str = ".bin.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub abi: Utf8PathBuf,
    pub bin: Utf8PathBuf,
}

impl ArtifactPaths {
    pub fn for_unit(dir: &Utf8Path, unit: &str) -> Self {
        Self {
            abi: dir.join(format!("{unit}{ABI_SUFFIX}")),
            bin: dir.join(format!("{unit}{BIN_SUFFIX}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: Utf8PathBuf,
}

impl ArtifactStore {
    /// Crée le dossier de sortie si besoin (idempotent).
    pub fn ensure_ready(dir: impl Into<Utf8PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::ensure_dir(&dir).map_err(|source| BuildError::OutputDir { dir: dir.clone(), source })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Écrit la paire d'artefacts d'une unité et renvoie leurs chemins.
    pub fn persist(&self, unit: &str, compiled: &CompiledUnit) -> Result<ArtifactPaths> {
        let paths = ArtifactPaths::for_unit(&self.dir, unit);

        // Même rendu que JSON.stringify(abi, null, 2) : indentation 2, pas de \n final.
        let abi = serde_json::to_string_pretty(&compiled.abi)
            .map_err(|e| BuildError::Write { path: paths.abi.clone(), source: e.into() })?;
        write(&paths.abi, abi.as_bytes())?;
        write(&paths.bin, compiled.payload().as_bytes())?;

        trace!("artefacts {unit}: {} / {}", paths.abi, paths.bin);
        Ok(paths)
    }
}

fn write(path: &Utf8Path, bytes: &[u8]) -> Result<()> {
    fs::write_all(path, bytes).map_err(|source| BuildError::Write { path: path.to_owned(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Bytecode, Evm};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn unit(abi: serde_json::Value, object: &str) -> CompiledUnit {
        CompiledUnit { abi, evm: Evm { bytecode: Bytecode { object: object.into() } } }
    }

    fn tmp_store() -> (tempfile::TempDir, ArtifactStore) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::from_path_buf(tmp.path().join("artifacts")).unwrap();
        let store = ArtifactStore::ensure_ready(dir).unwrap();
        (tmp, store)
    }

    #[test]
    fn writes_pretty_abi_and_raw_bytecode() {
        let (_tmp, store) = tmp_store();
        let abi = json!([{ "inputs": [], "name": "get", "type": "function" }]);
        let paths = store.persist("Foo", &unit(abi, "6080604052")).unwrap();

        assert_eq!(paths.abi.file_name(), Some("Foo.abi.json"));
        assert_eq!(paths.bin.file_name(), Some("Foo.bin.txt"));
        assert_eq!(
            std::fs::read_to_string(&paths.abi).unwrap(),
            "[\n  {\n    \"inputs\": [],\n    \"name\": \"get\",\n    \"type\": \"function\"\n  }\n]"
        );
        assert_eq!(std::fs::read_to_string(&paths.bin).unwrap(), "6080604052");
    }

    #[test]
    fn overwrites_existing_pair() {
        let (_tmp, store) = tmp_store();
        store.persist("Foo", &unit(json!([]), "aa")).unwrap();
        let paths = store.persist("Foo", &unit(json!([]), "bb")).unwrap();
        assert_eq!(std::fs::read_to_string(&paths.bin).unwrap(), "bb");
    }

    #[test]
    fn ensure_ready_twice() {
        let (_tmp, store) = tmp_store();
        let again = ArtifactStore::ensure_ready(store.dir().to_owned()).unwrap();
        assert_eq!(again.dir(), store.dir());
    }

    #[test]
    fn output_dir_blocked_by_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = Utf8PathBuf::from_path_buf(tmp.path().join("artifacts")).unwrap();
        std::fs::write(&file, "not a dir").unwrap();
        let err = ArtifactStore::ensure_ready(file).unwrap_err();
        assert!(matches!(err, BuildError::OutputDir { .. }));
    }
}
