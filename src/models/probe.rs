//! Outcome of the HTTPS probe stage.

use serde::Serialize;

/// Final status of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// No attempt has completed yet.
    #[default]
    Pending,
    /// A certificate was captured over HTTPS.
    Valid,
    /// The domain answered over plain HTTP only.
    Missing,
    /// The last attempt failed and no certificate was obtained.
    Unknown,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Pending => "pending",
            ProbeStatus::Valid => "valid",
            ProbeStatus::Missing => "missing",
            ProbeStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded problem from a probe attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeError {
    /// Short category, e.g. `"timeout"` or `"no https support"`.
    pub kind: String,
    pub message: String,
    /// Error class that produced the entry, absent for notes the loop adds itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl ProbeError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            class: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

/// Result of the HTTPS probe for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProbeInfo {
    pub status: ProbeStatus,
    /// Final URL after redirects, from the last successful response.
    pub home_page: Option<String>,
    pub redirected: bool,
    pub attempts: usize,
    pub errors: Vec<ProbeError>,
    /// Kind of the last recorded error; `None` exactly when the status is valid.
    pub reason: Option<String>,
}

impl ProbeInfo {
    pub fn is_valid(&self) -> bool {
        self.status == ProbeStatus::Valid
    }
}
