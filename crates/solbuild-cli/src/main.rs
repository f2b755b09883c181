use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};
use color_eyre::eyre::{Result, WrapErr};
use log::LevelFilter;
use solbuild::config::{self, DEFAULT_MANIFEST};
use solbuild::{BuildConfig, BuildError, ConsoleReporter, EmitPolicy, Manifest, Pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "solbuild",
    version,
    about = "Compile chaque contracts/*.sol via solc et écrit artifacts/<Unit>.abi.json + <Unit>.bin.txt",
    long_about = None
)]
struct Cli {
    /// Dossier des sources .sol (défaut: contracts)
    #[arg(long, value_name = "DIR")]
    sources: Option<Utf8PathBuf>,

    /// Dossier de sortie des artefacts (défaut: artifacts)
    #[arg(long, value_name = "DIR")]
    out: Option<Utf8PathBuf>,

    /// Binaire solc à utiliser (sinon SOLC_BIN ou 'solc')
    #[arg(long, value_name = "PATH")]
    solc: Option<Utf8PathBuf>,

    /// Délai max par appel à solc, en secondes (0 = illimité)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Manifest optionnel (ignoré s'il n'existe pas)
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    manifest: Utf8PathBuf,

    /// N'écrit pas les unités d'un fichier qui a des erreurs bloquantes
    #[arg(long)]
    skip_on_error: bool,

    /// Verbosité (répéter pour plus de bruit)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Seulement diagnostics et échecs
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// défauts < manifest < flags
    fn config(&self) -> Result<BuildConfig> {
        let mut cfg = BuildConfig::default();
        if let Some(m) = Manifest::read_optional(&self.manifest)? {
            log::debug!("manifest {} chargé", self.manifest);
            cfg = cfg.merge_manifest(m);
        }
        if let Some(p) = &self.sources {
            cfg.sources_dir.clone_from(p);
        }
        if let Some(p) = &self.out {
            cfg.artifacts_dir.clone_from(p);
        }
        if let Some(bin) = &self.solc {
            cfg.solc_bin = Some(bin.clone());
        }
        if let Some(secs) = self.timeout {
            cfg.timeout = config::timeout_from_secs(secs);
        }
        if self.skip_on_error {
            cfg.emit = EmitPolicy::SkipOnError;
        }
        Ok(cfg)
    }

    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // RUST_LOG garde le dernier mot
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let cfg = cli.config()?;
    log::debug!("config: {cfg:?}");

    let mut reporter = ConsoleReporter::new(cli.quiet);
    match Pipeline::with_solc(cfg).run(&mut reporter) {
        // les échecs par fichier ont déjà été rapportés, ils ne changent pas le code de sortie
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(BuildError::NoSources { dir }) => {
            eprintln!("❌ No .sol files found in {dir}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).wrap_err("build interrompu"),
    }
}
