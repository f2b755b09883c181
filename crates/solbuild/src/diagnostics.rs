//! Diagnostics du compilateur et leur classement bloquant / non bloquant.

use serde::Deserialize;

/// Sévérité rapportée par solc. Toute valeur inconnue est traitée comme `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    #[serde(other)]
    Info,
}

impl Severity {
    /// Seule `error` bloque ; warning/info restent consultatifs.
    pub fn is_blocking(self) -> bool {
        matches!(self, Severity::Error)
    }

    fn marker(self) -> &'static str {
        if self.is_blocking() { "❌" } else { "⚠️" }
    }
}

/// Position dans le source (offsets en octets, comme solc).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawDiagnostic")]
pub struct Diagnostic {
    pub severity: Severity,
    /// `formattedMessage` si présent, sinon `message`
    pub message: String,
    /// Catégorie solc (`ParserError`, `TypeError`, `Warning`…)
    pub kind: Option<String>,
    pub location: Option<SourceLocation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDiagnostic {
    severity: Severity,
    #[serde(default)]
    formatted_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    source_location: Option<SourceLocation>,
}

impl From<RawDiagnostic> for Diagnostic {
    fn from(raw: RawDiagnostic) -> Self {
        let message = raw
            .formatted_message
            .or(raw.message)
            .unwrap_or_default();
        Self {
            severity: raw.severity,
            message,
            kind: raw.kind,
            location: raw.source_location,
        }
    }
}

impl Diagnostic {
    pub fn error(msg: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, msg)
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, msg)
    }

    fn with_severity(severity: Severity, msg: impl Into<String>) -> Self {
        Self { severity, message: msg.into(), kind: None, location: None }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }

    /// Ligne affichable : `❌` pour les erreurs, `⚠️` pour le reste.
    pub fn render(&self) -> String {
        format!("{} {}", self.severity.marker(), self.message.trim_end())
    }
}

/// Décompte des diagnostics d'un fichier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub blocking: usize,
    pub advisory: usize,
}

impl Tally {
    pub fn has_blocking(&self) -> bool {
        self.blocking > 0
    }
}

pub fn classify(diags: &[Diagnostic]) -> Tally {
    diags.iter().fold(Tally::default(), |mut t, d| {
        if d.is_blocking() {
            t.blocking += 1;
        } else {
            t.advisory += 1;
        }
        t
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_solc_error_entry() {
        let d: Diagnostic = serde_json::from_str(
            r#"{
                "component": "general",
                "errorCode": "2314",
                "formattedMessage": "ParserError: Expected ';' but got '}'\n --> B.sol:4:5:\n",
                "message": "Expected ';' but got '}'",
                "severity": "error",
                "sourceLocation": { "end": 80, "file": "B.sol", "start": 79 },
                "type": "ParserError"
            }"#,
        )
        .unwrap();
        assert!(d.is_blocking());
        assert_eq!(d.kind.as_deref(), Some("ParserError"));
        assert_eq!(d.location.as_ref().map(|l| l.file.as_str()), Some("B.sol"));
        assert_eq!(d.render(), "❌ ParserError: Expected ';' but got '}'\n --> B.sol:4:5:");
    }

    #[test]
    fn falls_back_to_plain_message() {
        let d: Diagnostic =
            serde_json::from_str(r#"{ "severity": "warning", "message": "unused variable" }"#).unwrap();
        assert_eq!(d.message, "unused variable");
        assert_eq!(d.render(), "⚠️ unused variable");
    }

    #[test]
    fn unknown_severity_is_advisory() {
        let d: Diagnostic =
            serde_json::from_str(r#"{ "severity": "note", "formattedMessage": "fyi" }"#).unwrap();
        assert_eq!(d.severity, Severity::Info);
        assert!(!d.is_blocking());
    }

    #[test]
    fn classify_counts() {
        let diags = vec![
            Diagnostic::error("a"),
            Diagnostic::warning("b"),
            Diagnostic::warning("c"),
            Diagnostic::with_severity(Severity::Info, "d"),
        ];
        let t = classify(&diags);
        assert_eq!(t, Tally { blocking: 1, advisory: 3 });
        assert!(t.has_blocking());
        assert!(!classify(&[]).has_blocking());
    }
}
