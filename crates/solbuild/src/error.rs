use camino::Utf8PathBuf;
use thiserror::Error;

/// Échecs de la passerelle compilateur (lancement, transport, réponse illisible).
///
/// Une erreur de compilation *n'est pas* une `GatewayError` : solc la rapporte
/// dans `errors[]` d'une réponse bien formée.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Le binaire n'a pas pu être lancé (absent du PATH, droits…)
    #[error("impossible de lancer `{bin}`: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O sur les pipes du processus enfant
    #[error("io avec le compilateur: {0}")]
    Io(#[from] std::io::Error),

    /// Pas de réponse dans le délai imparti (le processus est tué)
    #[error("le compilateur n'a pas répondu en {secs}s")]
    Timeout { secs: u64 },

    /// Le compilateur s'est arrêté sans produire de JSON exploitable
    #[error("le compilateur a échoué ({status}): {stderr}")]
    Crashed { status: String, stderr: String },

    /// Sortie non conforme au protocole standard-json
    #[error("réponse JSON invalide: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Erreurs du build.
///
/// Seules `NoSources`, `SourcesDir`, `OutputDir` et `Manifest` arrêtent le run ;
/// les autres sont confinées au fichier en cours.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("aucun fichier .sol trouvé dans {dir}")]
    NoSources { dir: Utf8PathBuf },

    #[error("dossier des sources illisible {dir}: {source}")]
    SourcesDir {
        dir: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("impossible de créer le dossier d'artefacts {dir}: {source}")]
    OutputDir {
        dir: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lecture de {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("solc: {source}")]
    Gateway {
        file: String,
        #[source]
        source: GatewayError,
    },

    #[error("écriture de {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest {path} invalide: {reason}")]
    Manifest { path: Utf8PathBuf, reason: String },
}

impl BuildError {
    /// Vrai si l'erreur doit interrompre tout le run (et non un seul fichier).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoSources { .. }
                | Self::SourcesDir { .. }
                | Self::OutputDir { .. }
                | Self::Manifest { .. }
        )
    }
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
