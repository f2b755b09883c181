//! solbuild — étape de build batch pour contrats Solidity.
//! - Découvre les `.sol` d'un dossier et les compile un par un via `solc --standard-json`
//! - Classe les diagnostics (erreurs bloquantes / avertissements) sans bloquer l'écriture
//! - Écrit `<Unit>.abi.json` + `<Unit>.bin.txt` pour chaque unité produite
//! - API orientée outil (CLI, scripts de build) ; le compilateur est derrière le trait [`Toolchain`].

pub mod backends;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod protocol;
pub mod report;
pub mod store;
mod util;

pub use backends::Toolchain;
pub use config::{BuildConfig, EmitPolicy, Manifest};
pub use diagnostics::{classify, Diagnostic, Severity, Tally};
pub use error::{BuildError, GatewayError};
pub use pipeline::{discover_sources, FileOutcome, FileReport, Pipeline, RunSummary, SourceFile};
pub use protocol::{CompileRequest, CompileResult, CompiledUnit};
pub use report::{ConsoleReporter, Reporter};
pub use store::{ArtifactPaths, ArtifactStore};

#[cfg(feature = "solc-cli")]
pub use backends::solc_cli::SolcCli;
