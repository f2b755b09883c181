//! Passerelle vers le compilateur : un appel synchrone requête → réponse.

use crate::error::GatewayError;
use crate::protocol::{CompileRequest, CompileResult};

#[cfg(feature = "solc-cli")]
pub mod solc_cli;

/// Un compilateur capable de traiter une requête standard-json.
///
/// Les erreurs de compilation sont rendues *dans* le `CompileResult` ;
/// `Err` est réservé aux échecs d'invocation ou de protocole.
pub trait Toolchain {
    fn compile(&self, request: &CompileRequest) -> Result<CompileResult, GatewayError>;

    /// Version lisible du compilateur, si connue.
    fn version(&self) -> Option<String> {
        None
    }
}

impl<T: Toolchain + ?Sized> Toolchain for &T {
    fn compile(&self, request: &CompileRequest) -> Result<CompileResult, GatewayError> {
        (**self).compile(request)
    }

    fn version(&self) -> Option<String> {
        (**self).version()
    }
}
