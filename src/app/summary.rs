//! Run summary: counts over the completed records.

use std::collections::BTreeMap;

use crate::certificate::PolicyType;
use crate::config::Detail;
use crate::models::{DomainRecord, ProbeStatus};

/// Aggregate counts over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    /// Records whose probe reached the server over either scheme.
    pub connected: usize,
    pub https_support: usize,
    pub only_http: usize,
    /// Failed probes, keyed by reason.
    pub errors: BTreeMap<String, usize>,
    pub policy_types: BTreeMap<PolicyType, usize>,
    pub ocsp: BTreeMap<String, usize>,
}

impl Summary {
    pub fn error_count(&self) -> usize {
        self.errors.values().sum()
    }

    fn policy_count(&self, policy: PolicyType) -> usize {
        self.policy_types.get(&policy).copied().unwrap_or(0)
    }
}

pub fn create_summary(records: &[DomainRecord]) -> Summary {
    let mut summary = Summary {
        total: records.len(),
        ..Default::default()
    };

    for record in records {
        let Some(probe) = &record.probe else {
            continue;
        };
        if probe.status != ProbeStatus::Unknown {
            summary.connected += 1;
        }
        match probe.status {
            ProbeStatus::Unknown => {
                let reason = probe.reason.clone().unwrap_or_else(|| "unknown".into());
                *summary.errors.entry(reason).or_default() += 1;
            }
            ProbeStatus::Missing => summary.only_http += 1,
            ProbeStatus::Valid => {
                summary.https_support += 1;
                if let Some(cert) = &record.cert {
                    *summary.policy_types.entry(cert.policy_type()).or_default() += 1;
                }
                if let Some(ocsp) = &record.ocsp {
                    *summary.ocsp.entry(ocsp.status.to_string()).or_default() += 1;
                }
            }
            ProbeStatus::Pending => {
                log::warn!(
                    "Record #{} ({}) finished with a pending probe",
                    record.index,
                    record.domain
                );
            }
        }
    }
    summary
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Summary lines for the terminal. `Detailed` adds the error and OCSP breakdowns.
pub fn format_summary(summary: &Summary, detail: Detail) -> Vec<String> {
    if detail == Detail::None {
        return Vec::new();
    }

    let total = summary.total;
    let conn = summary.connected;
    let errors = summary.error_count();
    let policies: usize = summary.policy_types.values().sum();

    let mut lines = vec![
        format!("fetched {} certificates.", summary.https_support),
        String::new(),
        "=== SUMMARY ===".to_string(),
        format!("received {total} domains;"),
        format!(
            "successfully connected to {conn} ({:.2}%) servers ({errors} ({:.2}%) errors);",
            percent(conn, total),
            percent(errors, total)
        ),
    ];

    if detail >= Detail::Detailed && !summary.errors.is_empty() {
        lines.push("error types:".to_string());
        for (kind, count) in &summary.errors {
            lines.push(format!("\t{kind}: {count} ({:.2}%)", percent(*count, errors)));
        }
    }

    lines.push(format!(
        "{} ({:.2}%) of which supported HTTPS, and {} ({:.2}%) didn't;",
        summary.https_support,
        percent(summary.https_support, conn),
        summary.only_http,
        percent(summary.only_http, conn)
    ));

    let ev = summary.policy_count(PolicyType::Ev);
    let ov = summary.policy_count(PolicyType::Ov);
    let dv = summary.policy_count(PolicyType::Dv);
    lines.push(format!(
        "policy types: {ev} EV ({:.2}%), {ov} OV ({:.2}%) and {dv} DV ({:.2}%)",
        percent(ev, policies),
        percent(ov, policies),
        percent(dv, policies)
    ));

    if detail >= Detail::Detailed && !summary.ocsp.is_empty() {
        lines.push("ocsp status:".to_string());
        for (status, count) in &summary.ocsp {
            lines.push(format!(
                "\t{status}: {count} ({:.2}%)",
                percent(*count, summary.https_support)
            ));
        }
    }

    lines
}
