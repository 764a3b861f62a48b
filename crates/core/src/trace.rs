//! Trace-file reader with one-element lookahead (spec §4.1).

use std::io::{BufRead, BufReader, Read};

use tracing::warn;

use crate::common::SimError;
use crate::request::{OpKind, Request};

/// Reads whitespace-separated trace lines of the form
/// `<cpu_cycle_decimal> <op_code 0|1|2> <address_hex>`, holding at most one
/// parsed-but-unread request.
///
/// Malformed lines and out-of-range addresses are reported to the caller
/// (who logs and skips them, per spec §7's `ParseError`/`AddressOutOfRange`
/// recovery policy) rather than aborting the read.
pub struct TraceReader<R> {
    lines: std::io::Lines<BufReader<R>>,
    rows_per_bank: u32,
    lookahead: Option<Request>,
    at_eof: bool,
    next_line_no: usize,
}

impl<R: Read> TraceReader<R> {
    /// Wraps `source` as a trace reader, immediately priming the lookahead
    /// slot. `rows_per_bank` bounds the decoded row field.
    #[must_use]
    pub fn new(source: R, rows_per_bank: u32) -> Self {
        let mut reader = Self {
            lines: BufReader::new(source).lines(),
            rows_per_bank,
            lookahead: None,
            at_eof: false,
            next_line_no: 1,
        };
        reader.prep_next();
        reader
    }

    /// Pulls lines until one parses cleanly or the file is exhausted.
    /// Malformed lines are logged and skipped, matching the specification's
    /// "report to stderr; line skipped; simulation continues" policy.
    fn prep_next(&mut self) {
        loop {
            let Some(line) = self.lines.next() else {
                self.at_eof = true;
                self.lookahead = None;
                return;
            };
            let line_no = self.next_line_no;
            self.next_line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(component = "trace", line = line_no, error = %err, "failed to read trace line");
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line, line_no, self.rows_per_bank) {
                Ok(request) => {
                    self.lookahead = Some(request);
                    return;
                }
                Err(err) => {
                    warn!(component = "trace", text = %line, error = %err, "skipping trace line");
                }
            }
        }
    }

    /// Returns the arrival cycle of the held-but-unread request, or `None`
    /// at EOF.
    #[must_use]
    pub fn peek_next_time(&self) -> Option<u64> {
        self.lookahead.as_ref().map(|r| r.t_arrive)
    }

    /// Whether the reader has exhausted the trace and has no request held.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.at_eof && self.lookahead.is_none()
    }

    /// Returns the held request if its arrival time is `≤ now`, advancing
    /// the lookahead to the next parsed line. Returns `None` without
    /// advancing if the held request has not yet arrived, or the reader is
    /// at EOF.
    pub fn take_if_ready(&mut self, now: u64) -> Option<Request> {
        let ready = matches!(&self.lookahead, Some(req) if req.t_arrive <= now);
        if !ready {
            return None;
        }
        let request = self.lookahead.take();
        self.prep_next();
        request
    }
}

fn parse_line(line: &str, line_no: usize, rows_per_bank: u32) -> Result<Request, SimError> {
    let mut fields = line.split_whitespace();
    let (Some(cycle), Some(code), Some(addr), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(SimError::ParseError {
            line: line_no,
            reason: "expected exactly 3 whitespace-separated fields".to_string(),
        });
    };

    let t_arrive: u64 = cycle.parse().map_err(|_| SimError::ParseError {
        line: line_no,
        reason: "cpu_cycle field is not a valid decimal integer".to_string(),
    })?;
    let code: u8 = code.parse().map_err(|_| SimError::ParseError {
        line: line_no,
        reason: "op_code field is not a valid integer".to_string(),
    })?;
    let kind = OpKind::from_code(code).ok_or_else(|| SimError::ParseError {
        line: line_no,
        reason: format!("op_code {code} is not one of 0, 1, 2"),
    })?;
    let addr_digits = addr.strip_prefix("0x").unwrap_or(addr);
    let address = u64::from_str_radix(addr_digits, 16).map_err(|_| SimError::ParseError {
        line: line_no,
        reason: "address field is not valid hexadecimal".to_string(),
    })?;

    let request = Request::new(t_arrive, kind, address);
    if request.row() >= rows_per_bank {
        return Err(SimError::AddressOutOfRange {
            line: line_no,
            row: request.row(),
            rows_per_bank,
        });
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(contents: &str) -> TraceReader<Cursor<&[u8]>> {
        TraceReader::new(Cursor::new(contents.as_bytes()), 1 << 15)
    }

    #[test]
    fn parses_wellformed_lines_in_order() {
        let mut r = reader("0 0 0x0\n10 1 0x8\n");
        assert_eq!(r.peek_next_time(), Some(0));
        let first = r.take_if_ready(0).unwrap();
        assert_eq!(first.kind, OpKind::Read);
        assert_eq!(r.peek_next_time(), Some(10));
        assert!(r.take_if_ready(5).is_none());
        let second = r.take_if_ready(10).unwrap();
        assert_eq!(second.kind, OpKind::Write);
        assert!(r.is_eof());
    }

    #[test]
    fn skips_malformed_and_out_of_range_lines() {
        let mut r = reader("garbage line\n0 5 0x1\n0 0 0x800000\n1 0 0x8\n");
        let req = r.take_if_ready(1).unwrap();
        assert_eq!(req.t_arrive, 1);
        assert!(r.is_eof());
    }

    #[test]
    fn blank_lines_are_skipped_silently() {
        let mut r = reader("\n\n0 2 0x0\n");
        assert_eq!(r.peek_next_time(), Some(0));
    }

    #[test]
    fn empty_trace_is_immediately_eof() {
        let r = reader("");
        assert!(r.is_eof());
        assert_eq!(r.peek_next_time(), None);
    }
}
