//! Parsed rule-profiler trace records
//!
//! Each profiler log line marks the entry into or exit from one named
//! occurrence (an iRule event handler, a command, or a VM-level command)
//! on a specific flow. The types here are the fixed-shape representation
//! of one such line after parsing.

use std::fmt;

/// Matching domain for an occurrence.
///
/// EVENT records are kept on their own list; CMD and CMD_VM records share
/// a single list and are separated by the matching pass, so the two
/// command domains stay independent without reordering arrivals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// iRule event handler (RP_EVENT_*)
    Event,
    /// iRule command (RP_CMD_*)
    Cmd,
    /// VM-level command (RP_CMD_VM_*)
    CmdVm,
}

impl Category {
    /// All categories, in report order.
    pub const ALL: [Category; 3] = [Category::Event, Category::Cmd, Category::CmdVm];

    /// Occurrence-type label as it appears in the log payload.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Event => "RP_EVENT",
            Category::Cmd => "RP_CMD",
            Category::CmdVm => "RP_CMD_VM",
        }
    }

    /// Entry-marker type string for this category.
    pub fn entry_type(&self) -> &'static str {
        match self {
            Category::Event => "RP_EVENT_ENTRY",
            Category::Cmd => "RP_CMD_ENTRY",
            Category::CmdVm => "RP_CMD_VM_ENTRY",
        }
    }

    /// Exit-marker type string for this category.
    pub fn exit_type(&self) -> &'static str {
        match self {
            Category::Event => "RP_EVENT_EXIT",
            Category::Cmd => "RP_CMD_EXIT",
            Category::CmdVm => "RP_CMD_VM_EXIT",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a record opens or closes an occurrence instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Entry,
    Exit,
}

/// Classify an occurrence-type payload field into category and marker.
///
/// Returns `None` for anything outside the six recognized type strings;
/// such records are ignored rather than rejected.
pub fn classify_type(occurrence_type: &str) -> Option<(Category, Marker)> {
    match occurrence_type {
        "RP_EVENT_ENTRY" => Some((Category::Event, Marker::Entry)),
        "RP_EVENT_EXIT" => Some((Category::Event, Marker::Exit)),
        "RP_CMD_ENTRY" => Some((Category::Cmd, Marker::Entry)),
        "RP_CMD_EXIT" => Some((Category::Cmd, Marker::Exit)),
        "RP_CMD_VM_ENTRY" => Some((Category::CmdVm, Marker::Entry)),
        "RP_CMD_VM_EXIT" => Some((Category::CmdVm, Marker::Exit)),
        _ => None,
    }
}

/// One side of a connection, canonical form `ip%route_domain:port`.
///
/// All three parts are kept as the opaque strings the profiler logged;
/// the analyzer only ever compares them for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub ip: String,
    pub route_domain: String,
    pub port: String,
}

impl Endpoint {
    pub fn new(ip: &str, route_domain: &str, port: &str) -> Self {
        Self {
            ip: ip.to_string(),
            route_domain: route_domain.to_string(),
            port: port.to_string(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%{}:{}", self.ip, self.route_domain, self.port)
    }
}

/// A single parsed profiler trace record.
///
/// Records are immutable once parsed and kept in arrival order; matching
/// depends on that order, not just on the key fields.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceRecord {
    pub category: Category,
    pub marker: Marker,
    /// Microsecond counter, monotonic within a flow but not across flows.
    pub timestamp_us: i64,
    pub virtual_server: String,
    /// Name of the event handler or command.
    pub occurrence: String,
    pub tmm_pid: String,
    pub flow_id: String,
    /// Absent when the record carried no remote IP; two absent endpoints
    /// still compare equal for matching purposes.
    pub local: Option<Endpoint>,
    pub remote: Option<Endpoint>,
}

/// Composite key correlating an exit record with its entry record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub category: Category,
    pub occurrence: String,
    pub local: Option<Endpoint>,
    pub remote: Option<Endpoint>,
    pub flow_id: String,
    pub tmm_pid: String,
}

impl OccurrenceRecord {
    /// The identity key used to pair this record with its counterpart.
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            category: self.category,
            occurrence: self.occurrence.clone(),
            local: self.local.clone(),
            remote: self.remote.clone(),
            flow_id: self.flow_id.clone(),
            tmm_pid: self.tmm_pid.clone(),
        }
    }

    /// True when the correlation fields of both records are equal:
    /// occurrence, local/remote endpoint, flow id, and tmm pid.
    pub fn matches_identity(&self, other: &OccurrenceRecord) -> bool {
        self.occurrence == other.occurrence
            && self.local == other.local
            && self.remote == other.remote
            && self.flow_id == other.flow_id
            && self.tmm_pid == other.tmm_pid
    }
}
