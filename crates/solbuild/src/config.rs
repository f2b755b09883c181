use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::diagnostics::Tally;
use crate::error::{BuildError, Result};

pub const DEFAULT_SOURCES_DIR: &str = "contracts";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const DEFAULT_MANIFEST: &str = "solbuild.toml";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Que faire des unités d'un fichier qui a des diagnostics bloquants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmitPolicy {
    /// Écrire tout ce que solc a produit, erreurs ou pas.
    #[default]
    Always,
    /// Retenir les unités dès qu'une erreur bloquante est rapportée.
    SkipOnError,
}

impl EmitPolicy {
    pub fn allows(self, tally: &Tally) -> bool {
        match self {
            EmitPolicy::Always => true,
            EmitPolicy::SkipOnError => !tally.has_blocking(),
        }
    }
}

/// Configuration du build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Dossier des `.sol` (non récursif)
    pub sources_dir: Utf8PathBuf,
    /// Dossier de sortie des artefacts (créé si absent)
    pub artifacts_dir: Utf8PathBuf,
    /// Chemin du binaire `solc` (si non fourni: $SOLC_BIN ou 'solc' dans PATH)
    pub solc_bin: Option<Utf8PathBuf>,
    /// Délai max d'un appel au compilateur ; `None` = attente illimitée
    pub timeout: Option<Duration>,
    pub emit: EmitPolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            sources_dir: DEFAULT_SOURCES_DIR.into(),
            artifacts_dir: DEFAULT_ARTIFACTS_DIR.into(),
            solc_bin: std::env::var("SOLC_BIN").ok().map(Into::into),
            timeout: Some(DEFAULT_TIMEOUT),
            emit: EmitPolicy::Always,
        }
    }
}

impl BuildConfig {
    /// Rebase les chemins relatifs sur `root`.
    pub fn rooted_at(mut self, root: &Utf8Path) -> Self {
        if self.sources_dir.is_relative() {
            self.sources_dir = root.join(&self.sources_dir);
        }
        if self.artifacts_dir.is_relative() {
            self.artifacts_dir = root.join(&self.artifacts_dir);
        }
        self
    }

    /// Applique un manifest par-dessus la config courante (clés absentes ignorées).
    pub fn merge_manifest(mut self, m: Manifest) -> Self {
        if let Some(p) = m.paths.sources {
            self.sources_dir = p;
        }
        if let Some(p) = m.paths.artifacts {
            self.artifacts_dir = p;
        }
        if let Some(bin) = m.solc.bin {
            self.solc_bin = Some(bin);
        }
        if let Some(secs) = m.solc.timeout_secs {
            self.timeout = timeout_from_secs(secs);
        }
        if let Some(emit) = m.build.emit {
            self.emit = emit;
        }
        self
    }
}

/// `0` désactive le délai.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Manifest optionnel `solbuild.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub solc: SolcSection,
    #[serde(default)]
    pub build: BuildSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    pub sources: Option<Utf8PathBuf>,
    pub artifacts: Option<Utf8PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolcSection {
    pub bin: Option<Utf8PathBuf>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    pub emit: Option<EmitPolicy>,
}

impl Manifest {
    pub fn parse(path: &Utf8Path, s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| BuildError::Manifest {
            path: path.to_owned(),
            reason: e.message().to_string(),
        })
    }

    pub fn read(path: &Utf8Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| BuildError::Manifest {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Self::parse(path, &s)
    }

    /// Lit le manifest s'il existe, `None` sinon.
    pub fn read_optional(path: &Utf8Path) -> Result<Option<Self>> {
        if path.is_file() {
            Self::read(path).map(Some)
        } else {
            Ok(None)
        }
    }
}
