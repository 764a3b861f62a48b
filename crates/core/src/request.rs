//! Decoded memory requests and the DRAM commands that service them.
//!
//! This module provides:
//! 1. **Address decoding:** splitting a raw trace address into bank group,
//!    bank, row, and column fields (spec §4.1).
//! 2. **`Request`:** a decoded trace line plus its live scheduling state
//!    (`next_cmd`, `age`, `time_in_queue`) (spec §3).
//! 3. **`DramCommand`/`NextAction`:** the tight command enum and the
//!    request-progress sum type the Design Notes recommend in place of the
//!    original's sentinel `NONE`/`REMOVE` variants.

use crate::common::constants::{
    BANK_BITS, BANK_GROUP_BITS, BYTE_SELECT_BITS, LOWER_COLUMN_BITS, UPPER_COLUMN_BITS,
};

/// The kind of memory operation a request represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Data read (trace op code `0`).
    Read,
    /// Data write (trace op code `1`).
    Write,
    /// Instruction fetch (trace op code `2`).
    Ifetch,
}

impl OpKind {
    /// Parses a trace op code (`0`, `1`, or `2`) into an [`OpKind`].
    ///
    /// Returns `None` for any other value; the caller reports a
    /// [`crate::common::SimError::ParseError`].
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(OpKind::Read),
            1 => Some(OpKind::Write),
            2 => Some(OpKind::Ifetch),
            _ => None,
        }
    }

    /// Returns `true` if this request performs a DRAM WRITE column access
    /// (as opposed to READ, used by both `Read` and `Ifetch` requests).
    #[must_use]
    pub fn is_write(self) -> bool {
        matches!(self, OpKind::Write)
    }
}

/// The four DRAM commands the timing core and scheduler operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DramCommand {
    /// Closes the open row, returning the bank to `PRECHARGED`.
    Precharge,
    /// Opens a row, moving the bank to `ACTIVE`.
    Activate,
    /// Column read access to the open row.
    Read,
    /// Column write access to the open row.
    Write,
}

impl DramCommand {
    /// Short mnemonic used by the terse emitter (`PRE`, `ACT`, `RD `, `WR `).
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            DramCommand::Precharge => "PRE",
            DramCommand::Activate => "ACT",
            DramCommand::Read => "RD ",
            DramCommand::Write => "WR ",
        }
    }
}

/// What a request still needs before it can be removed from the queue.
///
/// Replaces the original's sentinel `REMOVE` enum variant: a request is
/// either waiting on a specific DRAM command, or `Done` and eligible for
/// removal once its trailing `age` drains to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// The request still needs this DRAM command issued.
    Pending(DramCommand),
    /// All commands have been issued; the request is draining its final
    /// completion latency before removal.
    Done,
}

/// The address fields decoded from a raw trace address (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAddress {
    /// Bits `[2:0]`: byte offset within the accessed column (not used for
    /// timing — addresses are never dereferenced, spec Non-goals).
    pub byte_select: u8,
    /// Bits `[5:3]`: lower 3 bits of the column address.
    pub lower_column: u8,
    /// Bits `[7:6]`: bank group index.
    pub bank_group: u8,
    /// Bits `[9:8]`: bank index within the group.
    pub bank: u8,
    /// Bits `[17:10]`: upper 8 bits of the column address.
    pub upper_column: u8,
    /// Bits `[32:18]`: row index.
    pub row: u32,
}

impl DecodedAddress {
    /// Decodes a raw trace address into its constituent fields.
    ///
    /// Field layout (spec §4.1): `[2:0]=byte_select`, `[5:3]=lower_column`,
    /// `[7:6]=bank_group`, `[9:8]=bank`, `[17:10]=upper_column`,
    /// `[32:18]=row`. The row field is not range-checked here; callers
    /// validate it against the DIMM's configured `rows_per_bank`.
    #[must_use]
    pub fn decode(addr: u64) -> Self {
        let byte_select = (addr & mask(BYTE_SELECT_BITS)) as u8;
        let lower_column = ((addr >> 3) & mask(LOWER_COLUMN_BITS)) as u8;
        let bank_group = ((addr >> 6) & mask(BANK_GROUP_BITS)) as u8;
        let bank = ((addr >> 8) & mask(BANK_BITS)) as u8;
        let upper_column = ((addr >> 10) & mask(UPPER_COLUMN_BITS)) as u8;
        let row = ((addr >> 18) & mask(15)) as u32;
        Self {
            byte_select,
            lower_column,
            bank_group,
            bank,
            upper_column,
            row,
        }
    }

    /// Reassembles the full column address from its upper and lower parts.
    ///
    /// `col = (upper_column << 3) | lower_column`, used by the terse
    /// emitter (spec §4.5).
    #[must_use]
    pub fn column(&self) -> u16 {
        (u16::from(self.upper_column) << 3) | u16::from(self.lower_column)
    }
}

#[inline]
fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

/// A decoded trace line plus its live scheduling state.
///
/// Created by the trace reader, mutated only by the scheduler, and
/// destroyed once `next_cmd == NextAction::Done` and `age == 0` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// CPU cycle at which this request arrived at the controller.
    pub t_arrive: u64,
    /// The kind of memory operation.
    pub kind: OpKind,
    /// The raw trace address (retained for diagnostics; never
    /// dereferenced — no data movement is modeled).
    pub address: u64,
    /// Decoded address fields.
    pub addr: DecodedAddress,
    /// The DRAM command still required to make progress, or `Done`.
    pub next_cmd: NextAction,
    /// CPU cycles until the next scheduling opportunity for this request;
    /// `0` means ready now. Saturates at `u8::MAX`.
    pub age: u8,
    /// CPU cycles since this request entered the pending queue. Saturates
    /// at `u16::MAX`.
    pub time_in_queue: u16,
}

impl Request {
    /// Creates a new request in its initial state: `next_cmd` is
    /// `Pending(Activate)` (every request must open its row first, even if
    /// the bank happens to already hold it open — the scheduler's decode
    /// step corrects this on the first tick by trying READ/WRITE first),
    /// `age` and `time_in_queue` both `0`.
    #[must_use]
    pub fn new(t_arrive: u64, kind: OpKind, address: u64) -> Self {
        Self {
            t_arrive,
            kind,
            address,
            addr: DecodedAddress::decode(address),
            next_cmd: NextAction::Pending(DramCommand::Activate),
            age: 0,
            time_in_queue: 0,
        }
    }

    /// Returns the bank group index for this request.
    #[must_use]
    pub fn group(&self) -> u8 {
        self.addr.bank_group
    }

    /// Returns the bank index (within its group) for this request.
    #[must_use]
    pub fn bank(&self) -> u8 {
        self.addr.bank
    }

    /// Returns the row index for this request.
    #[must_use]
    pub fn row(&self) -> u32 {
        self.addr.row
    }

    /// Returns `true` once this request has no more commands pending and
    /// its trailing age has drained — i.e. it is ready for removal.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.next_cmd == NextAction::Done && self.age == 0
    }
}
