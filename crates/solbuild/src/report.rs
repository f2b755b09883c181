//! Sortie utilisateur du build.
//!
//! Le pipeline ne fait qu'émettre des évènements ; c'est le `Reporter` qui
//! décide comment les afficher. `ConsoleReporter` reproduit la sortie
//! historique de l'outil (✅ / 📦 / 🔗 / ❌).

use log::{debug, info};

use crate::diagnostics::Diagnostic;
use crate::error::BuildError;
use crate::pipeline::RunSummary;
use crate::store::ArtifactPaths;

pub trait Reporter {
    fn run_started(&mut self, _files: usize) {}
    fn diagnostic(&mut self, file: &str, diag: &Diagnostic);
    fn unit_written(&mut self, file: &str, unit: &str, paths: &ArtifactPaths);
    fn units_withheld(&mut self, _file: &str, _count: usize) {}
    fn file_failed(&mut self, file: &str, err: &BuildError);
    fn run_finished(&mut self, _summary: &RunSummary) {}
}

/// Affichage console ; `quiet` ne garde que les diagnostics et les échecs.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Reporter for ConsoleReporter {
    fn run_started(&mut self, files: usize) {
        info!("{files} fichier(s) .sol à compiler");
    }

    fn diagnostic(&mut self, file: &str, diag: &Diagnostic) {
        debug!("{file}: diagnostic {:?} {:?}", diag.severity, diag.kind);
        println!("{}", diag.render());
    }

    fn unit_written(&mut self, file: &str, unit: &str, paths: &ArtifactPaths) {
        debug!("{file}: unité {unit} écrite");
        if self.quiet {
            return;
        }
        println!("\n✅ Compiled: {unit}");
        println!("📦 ABI saved to: {}", paths.abi);
        println!("🔗 Bytecode saved to: {}", paths.bin);
    }

    fn units_withheld(&mut self, file: &str, count: usize) {
        debug!("{file}: {count} unité(s) non écrite(s) (erreurs bloquantes)");
        if !self.quiet {
            println!("⏭️  {file}: {count} unité(s) ignorée(s) à cause des erreurs");
        }
    }

    fn file_failed(&mut self, file: &str, err: &BuildError) {
        debug!("{file}: échec {err:?}");
        eprintln!("❌ Compilation failed for {file}: {err}");
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        info!(
            "{} fichier(s), {} unité(s) écrite(s), {} échec(s)",
            summary.files.len(),
            summary.written_units().count(),
            summary.failed_files().count()
        );
    }
}
