//! Event-to-fingerprint reduction for dedup comparison.

use std::fmt;

use petrel_proto::WarningEvent;

/// Message prefixes that identify health-probe failures.
const PROBE_PREFIXES: [&str; 2] = ["Readiness", "Liveness"];

/// Probe failure messages embed the volatile probe target after this
/// marker. The `10.` literal assumes cluster-internal targets on a
/// private network.
const PROBE_TARGET_MARKER: &str = ": Get http://10.";

/// Stable string identity of an event, used to decide whether two events
/// report the same underlying condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// View the fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reduce an event to its dedup fingerprint.
///
/// The fingerprint is `{namespace}_{workload prefix}_{message}`, where the
/// workload prefix is the first hyphen-delimited segment of the subject
/// name, and health-probe messages (starting with `Readiness` or
/// `Liveness`) are cut at the probe-target marker with spaces replaced by
/// underscores, so repeated probe failures against different target IPs
/// compare equal.
///
/// The reduction is total and deterministic: any input produces a
/// fingerprint, and identical events always produce identical ones.
///
/// Known approximations: workloads whose base names share a first hyphen
/// segment collide, and the probe-target marker hardcodes a private `10.`
/// network prefix.
#[must_use]
pub fn reduce(event: &WarningEvent) -> Fingerprint {
    let subject = &event.subject;
    Fingerprint(format!(
        "{}_{}_{}",
        subject.namespace,
        workload_prefix(&subject.name),
        normalize_message(&event.message),
    ))
}

/// First hyphen-delimited segment of an instance name.
fn workload_prefix(name: &str) -> &str {
    name.split_once('-').map_or(name, |(prefix, _)| prefix)
}

/// Probe messages are truncated at the probe-target marker and
/// space-normalized; everything else passes through verbatim.
fn normalize_message(message: &str) -> String {
    if PROBE_PREFIXES.iter().any(|p| message.starts_with(p)) {
        let kept = message
            .split_once(PROBE_TARGET_MARKER)
            .map_or(message, |(prefix, _)| prefix);
        kept.replace(' ', "_")
    } else {
        message.to_string()
    }
}
