//! Trace line parsing
//!
//! Turns one raw log line into an [`OccurrenceRecord`] or a decision to
//! skip it. The profiler payload sits at whitespace field index 6,
//! concatenated with field index 7 when the payload itself contains a
//! space (command records), and is comma-separated with a fixed
//! twelve-field schema:
//!
//! timestamp, occurrence_type, virtual_server, occurrence, tmm_pid,
//! flow_id, remote_ip, remote_port, remote_rd, local_ip, local_port,
//! local_rd

use crate::record::{classify_type, Category, Endpoint, OccurrenceRecord};
use thiserror::Error;

/// Marker for variable-modification records, which this tool does not track.
pub const VAR_MOD_MARKER: &str = "RP_VAR_MOD";

/// Number of comma-separated fields the payload schema requires.
pub const PAYLOAD_FIELD_COUNT: usize = 12;

/// A recoverable per-line parse failure. The default policy is to skip
/// the line, count it, and continue; only input acquisition is fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line has {found} whitespace fields, profiler payload requires at least 7")]
    MissingPayload { found: usize },

    #[error("payload has {found} of the 12 required fields")]
    Malformed { found: usize },

    #[error("timestamp {value:?} is not an integer microsecond counter")]
    BadTimestamp { value: String },
}

/// Outcome of parsing a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// A recognized entry/exit record.
    Record(OccurrenceRecord),
    /// Variable-modification line, skipped by design.
    VarMod,
    /// Well-formed payload whose occurrence type is not one of the six
    /// recognized entry/exit strings; ignored.
    Unrecognized,
}

/// Parse one raw trace line.
pub fn parse_line(line: &str) -> Result<LineOutcome, ParseError> {
    if line.contains(VAR_MOD_MARKER) {
        return Ok(LineOutcome::VarMod);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 7 {
        return Err(ParseError::MissingPayload {
            found: fields.len(),
        });
    }

    // Command payloads carry one embedded space, splitting them across
    // fields 6 and 7; rejoin without reinserting the space.
    let payload = if fields.len() > 7 {
        format!("{}{}", fields[6], fields[7])
    } else {
        fields[6].to_string()
    };

    let parts: Vec<&str> = payload.split(',').map(str::trim).collect();
    if parts.len() < PAYLOAD_FIELD_COUNT {
        return Err(ParseError::Malformed { found: parts.len() });
    }

    let (category, marker) = match classify_type(parts[1]) {
        Some(kind) => kind,
        None => return Ok(LineOutcome::Unrecognized),
    };

    let timestamp_us: i64 = parts[0].parse().map_err(|_| ParseError::BadTimestamp {
        value: parts[0].to_string(),
    })?;

    // Endpoints exist only when the record carried a remote IP; records
    // without one can still match each other on equally-absent endpoints.
    let (local, remote) = if parts[6].is_empty() {
        (None, None)
    } else {
        (
            Some(Endpoint::new(parts[9], parts[11], parts[10])),
            Some(Endpoint::new(parts[6], parts[8], parts[7])),
        )
    };

    Ok(LineOutcome::Record(OccurrenceRecord {
        category,
        marker,
        timestamp_us,
        virtual_server: parts[2].to_string(),
        occurrence: parts[3].to_string(),
        tmm_pid: parts[4].to_string(),
        flow_id: parts[5].to_string(),
        local,
        remote,
    }))
}

/// Records of one run, split the way the matcher consumes them: events on
/// their own list, both command categories interleaved on a shared list.
/// Arrival order within each list is preserved.
#[derive(Debug, Default, Clone)]
pub struct ParsedRecords {
    pub events: Vec<OccurrenceRecord>,
    pub commands: Vec<OccurrenceRecord>,
}

impl ParsedRecords {
    /// The record list a category is matched over.
    pub fn list_for(&self, category: Category) -> &[OccurrenceRecord] {
        match category {
            Category::Event => &self.events,
            Category::Cmd | Category::CmdVm => &self.commands,
        }
    }
}

/// Per-run parsing counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseSummary {
    pub total_lines: u64,
    pub parsed: u64,
    pub var_mod_skipped: u64,
    pub malformed: u64,
    pub unrecognized: u64,
}

impl ParseSummary {
    /// Lines that were dropped rather than parsed into a record.
    pub fn rejected(&self) -> u64 {
        self.var_mod_skipped + self.malformed + self.unrecognized
    }
}

/// Parse a batch of lines with the default recovery policy: malformed
/// lines are skipped, counted, and logged. Callers that want to abort on
/// the first malformed line can drive [`parse_line`] themselves.
pub fn parse_lines<'a, I>(lines: I) -> (ParsedRecords, ParseSummary)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut records = ParsedRecords::default();
    let mut summary = ParseSummary::default();

    for line in lines {
        summary.total_lines += 1;
        match parse_line(line) {
            Ok(LineOutcome::Record(record)) => {
                summary.parsed += 1;
                match record.category {
                    Category::Event => records.events.push(record),
                    Category::Cmd | Category::CmdVm => records.commands.push(record),
                }
            }
            Ok(LineOutcome::VarMod) => summary.var_mod_skipped += 1,
            Ok(LineOutcome::Unrecognized) => summary.unrecognized += 1,
            Err(err) => {
                summary.malformed += 1;
                tracing::warn!(error = %err, line, "skipping malformed trace line");
            }
        }
    }

    (records, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Marker;

    const EVENT_ENTRY: &str = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
        1000,RP_EVENT_ENTRY,/Common/vs_http,HTTP_REQUEST,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0";
    const EVENT_EXIT: &str = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
        1500,RP_EVENT_EXIT,/Common/vs_http,HTTP_REQUEST,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0";
    const CMD_ENTRY_SPLIT: &str = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
        2000,RP_CMD_ENTRY,/Common/vs_http,HTTP::header insert,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0";
    const VAR_MOD: &str = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
        2100,RP_VAR_MOD,/Common/vs_http,foo,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0";

    #[test]
    fn test_parse_event_entry() {
        let record = match parse_line(EVENT_ENTRY).unwrap() {
            LineOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.category, Category::Event);
        assert_eq!(record.marker, Marker::Entry);
        assert_eq!(record.timestamp_us, 1000);
        assert_eq!(record.virtual_server, "/Common/vs_http");
        assert_eq!(record.occurrence, "HTTP_REQUEST");
        assert_eq!(record.tmm_pid, "0");
        assert_eq!(record.flow_id, "0x1f00");
        assert_eq!(record.local.unwrap().to_string(), "10.1.10.9%0:8443");
        assert_eq!(record.remote.unwrap().to_string(), "10.1.1.11%0:58424");
    }

    #[test]
    fn test_parse_exit_marker() {
        let record = match parse_line(EVENT_EXIT).unwrap() {
            LineOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.marker, Marker::Exit);
        assert_eq!(record.timestamp_us, 1500);
    }

    #[test]
    fn test_parse_command_payload_split_across_fields() {
        // The embedded space in "HTTP::header insert" splits the payload;
        // fields 6 and 7 are rejoined without restoring the space.
        let record = match parse_line(CMD_ENTRY_SPLIT).unwrap() {
            LineOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.category, Category::Cmd);
        assert_eq!(record.occurrence, "HTTP::headerinsert");
        assert_eq!(record.flow_id, "0x1f00");
    }

    #[test]
    fn test_var_mod_line_is_skipped() {
        assert_eq!(parse_line(VAR_MOD).unwrap(), LineOutcome::VarMod);
    }

    #[test]
    fn test_unrecognized_type_is_ignored() {
        let line = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
            1000,RP_SOMETHING_ELSE,/Common/vs,HTTP_REQUEST,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0";
        assert_eq!(parse_line(line).unwrap(), LineOutcome::Unrecognized);
    }

    #[test]
    fn test_short_line_is_missing_payload() {
        let err = parse_line("Jan  1 00:00:01 bigip1 info").unwrap_err();
        assert_eq!(err, ParseError::MissingPayload { found: 5 });
    }

    #[test]
    fn test_short_payload_is_malformed() {
        let line = "Jan  1 00:00:01 bigip1 info tmm[1234]: 1000,RP_EVENT_ENTRY,/Common/vs";
        let err = parse_line(line).unwrap_err();
        assert_eq!(err, ParseError::Malformed { found: 3 });
    }

    #[test]
    fn test_non_integer_timestamp_is_malformed() {
        let line = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
            abc,RP_EVENT_ENTRY,/Common/vs,HTTP_REQUEST,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0";
        assert_eq!(
            parse_line(line).unwrap_err(),
            ParseError::BadTimestamp {
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_empty_remote_ip_leaves_endpoints_absent() {
        let line = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
            1000,RP_EVENT_ENTRY,/Common/vs,RULE_INIT,0,0x0,,,,,,";
        let record = match parse_line(line).unwrap() {
            LineOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.local, None);
        assert_eq!(record.remote, None);
    }

    #[test]
    fn test_second_payload_fragment_joined_verbatim() {
        let line = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
            1000,RP_EVENT_ENTRY,/Common/vs,HTTP_REQUEST,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0 extra";
        // one trailing space splits the payload; fields 6 and 7 are
        // concatenated without the space, so "extra" fuses onto local_rd
        let record = match parse_line(line).unwrap() {
            LineOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.occurrence, "HTTP_REQUEST");
    }

    #[test]
    fn test_extra_payload_fields_are_ignored() {
        let line = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
            1000,RP_EVENT_ENTRY,/Common/vs,HTTP_REQUEST,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0,junk,junk";
        assert!(matches!(
            parse_line(line).unwrap(),
            LineOutcome::Record(_)
        ));
    }

    #[test]
    fn test_negative_timestamp_parses() {
        // Wrapped counters are kept as-is; sign is not validated
        let line = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
            -50,RP_EVENT_ENTRY,/Common/vs,HTTP_REQUEST,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0";
        let record = match parse_line(line).unwrap() {
            LineOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.timestamp_us, -50);
    }

    #[test]
    fn test_parse_lines_routes_commands_to_shared_list() {
        let vm_entry = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
            3000,RP_CMD_VM_ENTRY,/Common/vs_http,HTTP::uri,0,0x1f00,10.1.1.11,58424,0,10.1.10.9,8443,0";
        let (records, summary) = parse_lines([EVENT_ENTRY, CMD_ENTRY_SPLIT, vm_entry]);
        assert_eq!(records.events.len(), 1);
        assert_eq!(records.commands.len(), 2);
        assert_eq!(records.commands[0].category, Category::Cmd);
        assert_eq!(records.commands[1].category, Category::CmdVm);
        assert_eq!(summary.parsed, 3);
    }

    #[test]
    fn test_parse_lines_counts_every_disposition() {
        let malformed = "Jan  1 00:00:01 bigip1 info tmm[1234]: 1000,RP_EVENT_ENTRY";
        let unrecognized = "Jan  1 00:00:01 bigip1 info tmm[1234]: \
            1000,RP_OTHER,/Common/vs,X,0,0x0,,,,,,";
        let (records, summary) =
            parse_lines([EVENT_ENTRY, EVENT_EXIT, VAR_MOD, malformed, unrecognized]);
        assert_eq!(summary.total_lines, 5);
        assert_eq!(summary.parsed, 2);
        assert_eq!(summary.var_mod_skipped, 1);
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.unrecognized, 1);
        assert_eq!(summary.rejected(), 3);
        assert_eq!(records.events.len(), 2);
    }

    #[test]
    fn test_var_mod_never_reaches_record_lists() {
        let (records, summary) = parse_lines([VAR_MOD, VAR_MOD]);
        assert!(records.events.is_empty());
        assert!(records.commands.is_empty());
        assert_eq!(summary.var_mod_skipped, 2);
    }

    #[test]
    fn test_list_for_shares_command_list() {
        let (records, _) = parse_lines([CMD_ENTRY_SPLIT]);
        assert_eq!(records.list_for(Category::Cmd).len(), 1);
        assert_eq!(records.list_for(Category::CmdVm).len(), 1);
        assert!(records.list_for(Category::Event).is_empty());
    }
}
