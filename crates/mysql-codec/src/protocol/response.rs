//! OK, ERR and EOF response packets.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::protocol::{Encoding, EofPacket, OkPacket, Packet, error_name};

/// A server error decoded from an ERR packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrPacket {
    /// Error code
    pub error_code: u16,
    /// Mnemonic such as `ER_DUP_ENTRY`; `None` for codes missing from the table
    pub error_name: Option<&'static str>,
    /// SQL state (5 characters), present when the packet carries the `#` marker
    pub sql_state: Option<String>,
    /// Error message
    pub sql_message: String,
}

impl ErrPacket {
    /// Check if this is a unique constraint violation.
    pub fn is_duplicate_key(&self) -> bool {
        // ER_DUP_ENTRY
        self.error_code == 1062
    }

    /// Check if this is a foreign key constraint violation.
    pub fn is_foreign_key_violation(&self) -> bool {
        // ER_ROW_IS_REFERENCED_2, ER_NO_REFERENCED_ROW_2
        self.error_code == 1451 || self.error_code == 1452
    }
}

impl fmt::Display for ErrPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.error_name.unwrap_or("UNKNOWN"), self.error_code)?;
        if let Some(state) = &self.sql_state {
            write!(f, ", {state}")?;
        }
        write!(f, "): {}", self.sql_message)
    }
}

impl Packet<'_> {
    /// Decode this packet as an ERR packet.
    ///
    /// The cursor is rewound first. An error code missing from the mnemonic
    /// table still decodes, with `error_name` left empty.
    pub fn read_err_packet(&mut self, encoding: Encoding) -> Result<ErrPacket> {
        self.reset();
        self.skip(1)?;
        let error_code = self.read_u16_le()?;
        let sql_state = if self.peek_byte() == Some(b'#') {
            self.skip(1)?;
            Some(self.read_fixed_string(5, Encoding::Ascii)?)
        } else {
            None
        };
        let sql_message = self.read_rest_string(encoding);

        let error_name = error_name(error_code);
        if error_name.is_none() {
            tracing::debug!(error_code, "error code not in mnemonic table");
        }
        Ok(ErrPacket {
            error_code,
            error_name,
            sql_state,
            sql_message,
        })
    }

    /// Decode this packet as an OK packet (protocol 4.1).
    ///
    /// OK packet format:
    /// - 0x00 header
    /// - affected_rows: lenenc int
    /// - last_insert_id: lenenc int
    /// - status_flags: 2 bytes
    /// - warnings: 2 bytes
    /// - info: rest of packet (optional)
    pub fn read_ok_packet(&mut self, encoding: Encoding) -> Result<OkPacket> {
        self.reset();
        self.skip(1)?;
        let affected_rows = self.read_length_coded_u64()?.unwrap_or(0);
        let last_insert_id = self.read_length_coded_u64()?.unwrap_or(0);
        let status_flags = self.read_u16_le()?;
        let warnings = self.read_u16_le()?;
        let info = self.read_rest_string(encoding);
        Ok(OkPacket {
            affected_rows,
            last_insert_id,
            status_flags,
            warnings,
            info,
        })
    }

    /// Decode this packet as an EOF packet: 0xFE, warnings(2), status(2).
    pub fn read_eof_packet(&mut self) -> Result<EofPacket> {
        self.reset();
        self.skip(1)?;
        let warnings = self.read_u16_le()?;
        let status_flags = self.read_u16_le()?;
        Ok(EofPacket {
            warnings,
            status_flags,
        })
    }
}
