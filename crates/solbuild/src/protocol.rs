//! Protocole `solc --standard-json` : requête et réponse typées.
//!
//! Seuls les champs utiles au build sont modélisés ; le reste de la réponse
//! (`sources`, `gasEstimates`…) est ignoré. `abi` et `evm.bytecode.object`
//! sont obligatoires : une unité sans eux rend la réponse invalide.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::Diagnostic;

pub const LANGUAGE: &str = "Solidity";

#[derive(Debug, Clone, Serialize)]
pub struct CompileRequest {
    pub language: String,
    pub sources: BTreeMap<String, SourceInput>,
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInput {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Settings {
    /// `{ "*": { "*": ["*"] } }` : toutes les sorties, pour toutes les unités.
    pub fn select_everything() -> Self {
        let per_unit = BTreeMap::from([("*".to_string(), vec!["*".to_string()])]);
        Self { output_selection: BTreeMap::from([("*".to_string(), per_unit)]) }
    }
}

impl CompileRequest {
    /// Requête pour un seul fichier, indexé par son nom.
    pub fn single(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            language: LANGUAGE.to_string(),
            sources: BTreeMap::from([(file_name.into(), SourceInput { content: content.into() })]),
            settings: Settings::select_everything(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompileResult {
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
    /// fichier → unité → sortie compilée
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, CompiledUnit>>,
}

impl CompileResult {
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Unités produites pour `file` (vide si solc n'a rien émis).
    pub fn units_for<'a>(&'a self, file: &str) -> impl Iterator<Item = (&'a str, &'a CompiledUnit)> + 'a {
        self.contracts
            .get(file)
            .into_iter()
            .flat_map(|units| units.iter().map(|(name, unit)| (name.as_str(), unit)))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompiledUnit {
    pub abi: Value,
    pub evm: Evm,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Evm {
    pub bytecode: Bytecode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bytecode {
    pub object: String,
}

impl CompiledUnit {
    pub fn payload(&self) -> &str {
        &self.evm.bytecode.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_wire_shape() {
        let req = CompileRequest::single("A.sol", "contract Foo {}");
        let v: Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "language": "Solidity",
                "sources": { "A.sol": { "content": "contract Foo {}" } },
                "settings": { "outputSelection": { "*": { "*": ["*"] } } }
            })
        );
    }

    #[test]
    fn parses_multi_unit_response() {
        let res = CompileResult::from_json(indoc! {r#"
            {
              "contracts": {
                "A.sol": {
                  "Foo": { "abi": [], "evm": { "bytecode": { "object": "6080" }, "gasEstimates": null } },
                  "Bar": { "abi": [{ "type": "constructor", "inputs": [] }], "evm": { "bytecode": { "object": "6001" } } }
                }
              },
              "sources": { "A.sol": { "id": 0 } }
            }
        "#})
        .unwrap();
        assert!(res.errors.is_empty());
        let names: Vec<_> = res.units_for("A.sol").map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Bar", "Foo"]);
        let (_, foo) = res.units_for("A.sol").find(|(n, _)| *n == "Foo").unwrap();
        assert_eq!(foo.payload(), "6080");
        assert_eq!(res.units_for("Other.sol").count(), 0);
    }

    #[test]
    fn errors_only_response() {
        let res = CompileResult::from_json(
            r#"{ "errors": [ { "severity": "error", "formattedMessage": "ParserError: boom" } ] }"#,
        )
        .unwrap();
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.units_for("B.sol").count(), 0);
    }

    #[test]
    fn unit_without_bytecode_is_rejected() {
        let err = CompileResult::from_json(r#"{ "contracts": { "A.sol": { "Foo": { "abi": [] } } } }"#);
        assert!(err.is_err());
    }
}
