//! Canonical payload construction
//!
//! A claim is signed over a compact JSON object with exactly four string
//! members, keys in lexicographic order and no insignificant whitespace:
//!
//! ```text
//! {"compliance_level":"basic","domain_name":"example.com","issued_at":"2026-02-24T12:00:00Z","status":"active"}
//! ```
//!
//! Strings are emitted ASCII-only. Anything outside printable ASCII is written
//! as a lowercase `\uXXXX` escape (UTF-16 surrogate pairs above the BMP), so
//! internationalized names produce the same bytes whichever JSON library
//! re-derives the payload.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io::{self, Write};

use crate::error::Result;
use crate::types::{ComplianceClaim, ComplianceStatus, IssuedAt};

/// Wire shape of the signed payload. Field order is the canonical key order.
#[derive(Serialize)]
struct CanonicalPayload<'a> {
    compliance_level: &'a str,
    domain_name: &'a str,
    issued_at: String,
    status: &'static str,
}

/// Compact JSON formatter that escapes every non-printable-ASCII character
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize a claim's fields into canonical bytes
///
/// Equal inputs (timestamps equal to the second) always produce identical
/// output; signing and verification both go through here.
pub fn canonicalize(
    domain_name: &str,
    status: ComplianceStatus,
    compliance_level: &str,
    issued_at: impl Into<IssuedAt>,
) -> Result<Vec<u8>> {
    let payload = CanonicalPayload {
        compliance_level,
        domain_name,
        issued_at: issued_at.into().to_canonical_string(),
        status: status.as_str(),
    };

    let mut out = Vec::with_capacity(128);
    let mut serializer = Serializer::with_formatter(&mut out, AsciiFormatter);
    payload.serialize(&mut serializer)?;
    Ok(out)
}

impl ComplianceClaim {
    /// Canonical bytes of this claim
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>> {
        canonicalize(
            &self.domain_name,
            self.status,
            &self.compliance_level,
            self.issued_at,
        )
    }
}
