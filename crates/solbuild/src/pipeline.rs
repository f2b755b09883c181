//! Orchestrateur : découverte → solc → diagnostics → artefacts.
//!
//! Chaque fichier est traité en entier avant le suivant. Une erreur sur un
//! fichier (lecture, solc, écriture) est rapportée puis le run continue ;
//! seuls le dossier de sortie, le dossier des sources et l'absence de `.sol`
//! arrêtent tout.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::backends::Toolchain;
use crate::config::BuildConfig;
use crate::diagnostics::{classify, Tally};
use crate::error::{BuildError, Result};
use crate::protocol::CompileRequest;
use crate::report::Reporter;
use crate::store::ArtifactStore;
use crate::util::fs;

pub const SOURCE_SUFFIX: &str = ".sol";

/// Un fichier source découvert ; son contenu est lu au moment de le compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Nom de fichier, clé de la requête et de `contracts` dans la réponse
    pub name: String,
    pub path: Utf8PathBuf,
}

impl SourceFile {
    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|source| BuildError::Read { path: self.path.clone(), source })
    }
}

/// Liste les `.sol` directement sous `dir`, triés par nom.
pub fn discover_sources(dir: &Utf8Path) -> Result<Vec<SourceFile>> {
    let paths = fs::list_with_suffix(dir, SOURCE_SUFFIX)
        .map_err(|source| BuildError::SourcesDir { dir: dir.to_owned(), source })?;
    Ok(paths
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string();
            Some(SourceFile { name, path })
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// solc a répondu ; les unités éventuelles ont été écrites
    Compiled,
    /// Unités retenues par `EmitPolicy::SkipOnError`
    Withheld,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file: String,
    pub tally: Tally,
    /// Unités effectivement écrites, dans l'ordre d'écriture
    pub units: Vec<String>,
    pub outcome: FileOutcome,
}

impl FileReport {
    fn new(file: &str) -> Self {
        Self { file: file.to_string(), tally: Tally::default(), units: Vec::new(), outcome: FileOutcome::Compiled }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
}

impl RunSummary {
    pub fn written_units(&self) -> impl Iterator<Item = &str> {
        self.files.iter().flat_map(|f| f.units.iter().map(String::as_str))
    }

    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| matches!(f.outcome, FileOutcome::Failed(_)))
    }

    pub fn blocking_diagnostics(&self) -> usize {
        self.files.iter().map(|f| f.tally.blocking).sum()
    }
}

/// Orchestrateur principal
pub struct Pipeline<T> {
    cfg: BuildConfig,
    toolchain: T,
}

#[cfg(feature = "solc-cli")]
impl Pipeline<crate::backends::solc_cli::SolcCli> {
    /// Pipeline sur le binaire `solc` décrit par la config.
    pub fn with_solc(cfg: BuildConfig) -> Self {
        let solc = crate::backends::solc_cli::SolcCli::new(&cfg);
        Self::new(cfg, solc)
    }
}

impl<T: Toolchain> Pipeline<T> {
    pub fn new(cfg: BuildConfig, toolchain: T) -> Self {
        Self { cfg, toolchain }
    }

    /// Compile tous les `.sol` du dossier source.
    ///
    /// `Err` uniquement pour les erreurs de run ([`BuildError::is_fatal`]) ;
    /// les échecs par fichier sont dans le `RunSummary` et passés au `Reporter`.
    pub fn run(&self, reporter: &mut dyn Reporter) -> Result<RunSummary> {
        let store = ArtifactStore::ensure_ready(self.cfg.artifacts_dir.clone())?;

        let sources = discover_sources(&self.cfg.sources_dir)?;
        if sources.is_empty() {
            return Err(BuildError::NoSources { dir: self.cfg.sources_dir.clone() });
        }

        if let Some(v) = self.toolchain.version() {
            debug!("compilateur: solc {v}");
        }
        reporter.run_started(sources.len());

        let mut summary = RunSummary::default();
        for src in &sources {
            let mut report = FileReport::new(&src.name);
            if let Err(err) = self.compile_one(src, &store, reporter, &mut report) {
                reporter.file_failed(&src.name, &err);
                report.outcome = FileOutcome::Failed(err.to_string());
            }
            summary.files.push(report);
        }

        reporter.run_finished(&summary);
        Ok(summary)
    }

    fn compile_one(
        &self,
        src: &SourceFile,
        store: &ArtifactStore,
        reporter: &mut dyn Reporter,
        report: &mut FileReport,
    ) -> Result<()> {
        debug!("compilation de {}", src.path);
        let content = src.read()?;
        let request = CompileRequest::single(src.name.as_str(), content);
        let result = self
            .toolchain
            .compile(&request)
            .map_err(|source| BuildError::Gateway { file: src.name.clone(), source })?;

        for diag in &result.errors {
            reporter.diagnostic(&src.name, diag);
        }
        report.tally = classify(&result.errors);

        let units: Vec<_> = result.units_for(&src.name).collect();
        debug!("{}: {} unité(s), {:?}", src.name, units.len(), report.tally);

        if !self.cfg.emit.allows(&report.tally) {
            if !units.is_empty() {
                report.outcome = FileOutcome::Withheld;
                reporter.units_withheld(&src.name, units.len());
            }
            return Ok(());
        }

        for (name, unit) in units {
            let paths = store.persist(name, unit)?;
            report.units.push(name.to_string());
            reporter.unit_written(&src.name, name, &paths);
        }
        Ok(())
    }
}
