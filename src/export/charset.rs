//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Output Charset Module
//!
//! Character encodings for table files and the manifest. Text that cannot be
//! represented in the chosen charset is an error rather than a silent
//! substitution.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};

/// Supported output charsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ZiCharset {
    #[default]
    Utf8,
    Ascii,
    /// ISO-8859-1.
    Latin1,
    /// UTF-16, little endian, no byte order mark.
    Utf16Le,
    /// UTF-16, big endian, no byte order mark.
    Utf16Be,
}

impl ZiCharset {
    /// Canonical charset name.
    pub fn name(&self) -> &'static str {
        match self {
            ZiCharset::Utf8 => "UTF-8",
            ZiCharset::Ascii => "US-ASCII",
            ZiCharset::Latin1 => "ISO-8859-1",
            ZiCharset::Utf16Le => "UTF-16LE",
            ZiCharset::Utf16Be => "UTF-16BE",
        }
    }

    /// Appends the encoded form of `text` to `out`.
    pub fn encode_into(&self, text: &str, out: &mut Vec<u8>) -> Result<()> {
        match self {
            ZiCharset::Utf8 => out.extend_from_slice(text.as_bytes()),
            ZiCharset::Ascii => {
                for c in text.chars() {
                    if !c.is_ascii() {
                        return Err(self.unmappable(c));
                    }
                    out.push(c as u8);
                }
            }
            ZiCharset::Latin1 => {
                for c in text.chars() {
                    let code = u32::from(c);
                    if code > 0xFF {
                        return Err(self.unmappable(c));
                    }
                    out.push(code as u8);
                }
            }
            ZiCharset::Utf16Le => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
            ZiCharset::Utf16Be => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
        }
        Ok(())
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(text.len());
        self.encode_into(text, &mut out)?;
        Ok(out)
    }

    /// Decodes bytes written in this charset.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            ZiCharset::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| ZiError::encoding(self.name(), e.to_string())),
            ZiCharset::Ascii => {
                if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(ZiError::encoding(
                        self.name(),
                        format!("non-ASCII byte at offset {}", pos),
                    ));
                }
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            }
            ZiCharset::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            ZiCharset::Utf16Le | ZiCharset::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(ZiError::encoding(self.name(), "odd number of bytes"));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| match self {
                        ZiCharset::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                        _ => u16::from_be_bytes([pair[0], pair[1]]),
                    })
                    .collect();
                String::from_utf16(&units).map_err(|e| ZiError::encoding(self.name(), e.to_string()))
            }
        }
    }

    fn unmappable(&self, c: char) -> ZiError {
        ZiError::encoding(
            self.name(),
            format!("character {:?} (U+{:04X}) is not representable", c, u32::from(c)),
        )
    }
}

impl fmt::Display for ZiCharset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ZiCharset {
    type Err = ZiError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "utf8" => Ok(ZiCharset::Utf8),
            "ascii" | "usascii" => Ok(ZiCharset::Ascii),
            "latin1" | "iso88591" => Ok(ZiCharset::Latin1),
            "utf16le" => Ok(ZiCharset::Utf16Le),
            "utf16be" => Ok(ZiCharset::Utf16Be),
            _ => Err(ZiError::config(format!("unsupported charset: {}", s))),
        }
    }
}

impl TryFrom<String> for ZiCharset {
    type Error = ZiError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ZiCharset> for String {
    fn from(charset: ZiCharset) -> Self {
        charset.name().to_string()
    }
}

/// Transcodes UTF-8 written to it into the target charset.
///
/// Multi-byte sequences split across writes are held back until complete.
pub struct ZiCharsetWriter<W: Write> {
    inner: W,
    charset: ZiCharset,
    pending: Vec<u8>,
    scratch: Vec<u8>,
}

impl<W: Write> ZiCharsetWriter<W> {
    pub fn new(inner: W, charset: ZiCharset) -> Self {
        ZiCharsetWriter {
            inner,
            charset,
            pending: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Returns the inner writer, failing if a partial sequence is left.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "truncated UTF-8 sequence at end of output",
            ));
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for ZiCharsetWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.charset == ZiCharset::Utf8 {
            self.inner.write_all(buf)?;
            return Ok(buf.len());
        }

        self.pending.extend_from_slice(buf);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
        let text = std::str::from_utf8(&self.pending[..valid])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.scratch.clear();
        self.charset
            .encode_into(text, &mut self.scratch)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        self.inner.write_all(&self.scratch)?;
        self.pending.drain(..valid);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
