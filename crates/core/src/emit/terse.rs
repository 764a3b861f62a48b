//! Terse (default) command-log emitter (spec §4.5).

use std::io::{self, Write};

use crate::common::SimError;
use crate::request::DramCommand;
use crate::scheduler::IssuedCommand;

use super::Emitter;

/// Writes one bit-exact line per issued DRAM command to any [`Write`]r.
pub struct TerseEmitter<W> {
    writer: W,
}

impl<W: Write> TerseEmitter<W> {
    /// Wraps `writer` as a terse emitter.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the emitter, returning the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn format_line(cmd: IssuedCommand) -> String {
        let mnemonic = cmd.cmd.mnemonic();
        match cmd.cmd {
            DramCommand::Precharge => {
                format!("{:>26}\t{} {:X} {:X}", cmd.now, mnemonic, cmd.group, cmd.bank)
            }
            DramCommand::Activate => format!(
                "{:>26}\t{} {:X} {:X} {:X}",
                cmd.now, mnemonic, cmd.group, cmd.bank, cmd.row
            ),
            DramCommand::Read | DramCommand::Write => format!(
                "{:>26}\t{} {:X} {:X} {:X}",
                cmd.now, mnemonic, cmd.group, cmd.bank, cmd.col
            ),
        }
    }
}

impl<W: Write> Emitter for TerseEmitter<W> {
    fn on_issue(&mut self, cmd: IssuedCommand) -> Result<(), SimError> {
        writeln!(self.writer, "{}", Self::format_line(cmd))?;
        Ok(())
    }

    fn tick(&mut self, _delta: u64) -> Result<(), SimError> {
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(cmd: DramCommand) -> IssuedCommand {
        IssuedCommand {
            now: 48,
            cmd,
            group: 0,
            bank: 0,
            row: 1,
            col: 0xAB,
            duration: 48,
            closed_row: None,
        }
    }

    #[test]
    fn activate_line_includes_row() {
        let line = TerseEmitter::<Vec<u8>>::format_line(cmd(DramCommand::Activate));
        assert_eq!(line, format!("{:>26}\tACT 0 0 1", 48));
    }

    #[test]
    fn read_line_includes_column_in_hex() {
        let line = TerseEmitter::<Vec<u8>>::format_line(cmd(DramCommand::Read));
        assert_eq!(line, format!("{:>26}\tRD  0 0 AB", 48));
    }

    #[test]
    fn precharge_line_omits_row_and_column() {
        let line = TerseEmitter::<Vec<u8>>::format_line(cmd(DramCommand::Precharge));
        assert_eq!(line, format!("{:>26}\tPRE 0 0", 48));
    }

    #[test]
    fn on_issue_writes_newline_terminated_line() {
        let mut emitter = TerseEmitter::new(Vec::new());
        emitter.on_issue(cmd(DramCommand::Write)).unwrap();
        let output = String::from_utf8(emitter.writer).unwrap();
        assert!(output.ends_with('\n'));
        assert_eq!(output.matches('\n').count(), 1);
    }
}
