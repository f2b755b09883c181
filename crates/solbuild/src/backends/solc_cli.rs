use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use wait_timeout::ChildExt;

use crate::backends::Toolchain;
use crate::config::BuildConfig;
use crate::error::GatewayError;
use crate::protocol::{CompileRequest, CompileResult};

/// Backend qui appelle le binaire `solc` en mode `--standard-json`.
#[derive(Debug, Clone)]
pub struct SolcCli {
    bin: String,
    /// Arguments placés avant ceux du protocole (ex: wrapper `sh script`)
    lead: Vec<String>,
    timeout: Option<Duration>,
}

struct Captured {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl SolcCli {
    pub fn new(cfg: &BuildConfig) -> Self {
        let bin = cfg.solc_bin.as_ref().map_or("solc", |s| s.as_str()).to_string();
        Self { bin, lead: Vec::new(), timeout: cfg.timeout }
    }

    pub fn from_bin(bin: impl Into<String>) -> Self {
        Self { bin: bin.into(), lead: Vec::new(), timeout: None }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, args: &[&str], input: Option<Vec<u8>>) -> Result<Captured, GatewayError> {
        let mut child = Command::new(&self.bin)
            .args(&self.lead)
            .args(args)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GatewayError::Spawn { bin: self.bin.clone(), source })?;

        // Tout passe par des threads : un enfant qui ne lit pas stdin ou qui
        // remplit stdout ne doit pas bloquer l'attente bornée plus bas.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let feeder = match (child.stdin.take(), input) {
            (Some(mut pipe), Some(bytes)) => Some(thread::spawn(move || pipe.write_all(&bytes))),
            _ => None,
        };

        let status = self.wait(&mut child)?;

        if let Some(feeder) = feeder {
            match feeder.join() {
                Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
                Ok(_) => {}
                Err(_) => return Err(std::io::Error::other("écriture stdin interrompue").into()),
            }
        }
        Ok(Captured { status, stdout: collect(stdout)?, stderr: collect(stderr)? })
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, GatewayError> {
        let Some(limit) = self.timeout else {
            return Ok(child.wait()?);
        };
        if let Some(status) = child.wait_timeout(limit)? {
            return Ok(status);
        }
        warn!("`{}` dépasse {}s, arrêt forcé", self.bin, limit.as_secs());
        // best-effort : le processus peut s'être terminé entre-temps
        let _ = child.kill();
        let _ = child.wait();
        Err(GatewayError::Timeout { secs: limit.as_secs() })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<std::io::Result<Vec<u8>>>> {
    pipe.map(|mut r| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            r.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<Vec<u8>, GatewayError> {
    match handle {
        None => Ok(Vec::new()),
        Some(h) => h
            .join()
            .map_err(|_| std::io::Error::other("lecture de la sortie interrompue"))?
            .map_err(GatewayError::from),
    }
}

impl Toolchain for SolcCli {
    fn compile(&self, request: &CompileRequest) -> Result<CompileResult, GatewayError> {
        let input = request.to_json()?;
        let out = self.run(&["--standard-json"], Some(input.into_bytes()))?;
        let stdout = String::from_utf8_lossy(&out.stdout);
        let crashed = || GatewayError::Crashed {
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        };

        if stdout.trim().is_empty() {
            return Err(crashed());
        }
        match CompileResult::from_json(&stdout) {
            Ok(result) => {
                if !out.status.success() {
                    // solc sort en ≠0 sur erreur de compilation, la réponse reste valide
                    debug!("`{}` terminé avec {} (réponse exploitable)", self.bin, out.status);
                }
                Ok(result)
            }
            Err(_) if !out.status.success() => Err(crashed()),
            Err(e) => Err(GatewayError::Malformed(e)),
        }
    }

    fn version(&self) -> Option<String> {
        let out = match self.run(&["--version"], None) {
            Ok(out) if out.status.success() => out,
            Ok(out) => {
                debug!("`{} --version` a échoué ({})", self.bin, out.status);
                return None;
            }
            Err(e) => {
                debug!("`{} --version`: {e}", self.bin);
                return None;
            }
        };
        let text = String::from_utf8_lossy(&out.stdout);
        text.lines()
            .find_map(|l| l.strip_prefix("Version:"))
            .map(|v| v.trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::Path;

    /// Faux `solc` : un script shell lancé via `sh` (pas d'exec direct du fichier).
    fn fake(dir: &Path, body: &str) -> SolcCli {
        let script = dir.join("fake-solc.sh");
        std::fs::write(&script, body).unwrap();
        SolcCli {
            bin: "sh".into(),
            lead: vec![script.to_string_lossy().into_owned()],
            timeout: Some(Duration::from_secs(10)),
        }
    }

    fn req() -> CompileRequest {
        CompileRequest::single("A.sol", "contract Foo {}")
    }

    #[test]
    fn parses_response_on_stdout() {
        let tmp = tempfile::tempdir().unwrap();
        let solc = fake(
            tmp.path(),
            r#"cat > /dev/null
printf '%s' '{"contracts":{"A.sol":{"Foo":{"abi":[],"evm":{"bytecode":{"object":"60"}}}}}}'
"#,
        );
        let res = solc.compile(&req()).unwrap();
        assert_eq!(res.units_for("A.sol").count(), 1);
    }

    #[test]
    fn request_reaches_stdin() {
        let tmp = tempfile::tempdir().unwrap();
        let solc = fake(
            tmp.path(),
            r#"if grep -q '"outputSelection"' ; then
  printf '%s' '{"errors":[{"severity":"warning","formattedMessage":"ok"}]}'
else
  printf '%s' '{"errors":[{"severity":"error","formattedMessage":"no request"}]}'
fi
"#,
        );
        let res = solc.compile(&req()).unwrap();
        assert_eq!(res.errors.len(), 1);
        assert!(!res.errors[0].is_blocking());
    }

    #[test]
    fn nonzero_exit_with_json_is_a_result() {
        let tmp = tempfile::tempdir().unwrap();
        let solc = fake(
            tmp.path(),
            r#"cat > /dev/null
printf '%s' '{"errors":[{"severity":"error","formattedMessage":"ParserError"}]}'
exit 1
"#,
        );
        let res = solc.compile(&req()).unwrap();
        assert!(res.errors[0].is_blocking());
    }

    #[test]
    fn garbage_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let solc = fake(tmp.path(), "cat > /dev/null\necho 'not json'\n");
        assert!(matches!(solc.compile(&req()), Err(GatewayError::Malformed(_))));
    }

    #[test]
    fn silent_failure_is_crash() {
        let tmp = tempfile::tempdir().unwrap();
        let solc = fake(tmp.path(), "cat > /dev/null\necho 'segfault' >&2\nexit 139\n");
        match solc.compile(&req()) {
            Err(GatewayError::Crashed { stderr, .. }) => assert_eq!(stderr, "segfault"),
            other => panic!("attendu Crashed, obtenu {other:?}"),
        }
    }

    #[test]
    fn timeout_kills_child() {
        let tmp = tempfile::tempdir().unwrap();
        let solc = fake(tmp.path(), "sleep 30\n").with_timeout(Some(Duration::from_millis(200)));
        assert!(matches!(solc.compile(&req()), Err(GatewayError::Timeout { .. })));
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let solc = SolcCli::from_bin("/nonexistent/solc-for-tests");
        assert!(matches!(solc.compile(&req()), Err(GatewayError::Spawn { .. })));
        assert_eq!(solc.version(), None);
    }

    #[test]
    fn version_line() {
        let tmp = tempfile::tempdir().unwrap();
        let solc = fake(
            tmp.path(),
            "echo 'solc, the solidity compiler commandline interface'\necho 'Version: 0.8.26+commit.8a97fa7a.Linux.g++'\n",
        );
        assert_eq!(solc.version().as_deref(), Some("0.8.26+commit.8a97fa7a.Linux.g++"));
    }
}
