// src/catalog/decode.rs

use encoding_rs::{Decoder, DecoderResult, Encoding, GBK};
use std::io::{self, Read};

const CHUNK_BYTES: usize = 64 * 1024;

/// Adapts a legacy-encoded byte stream into UTF-8 for the CSV tokenizer,
/// one chunk at a time.
///
/// Decoding never substitutes: a malformed sequence surfaces as an
/// `InvalidData` I/O error. A BOM is only stripped when it names the
/// requested encoding.
pub struct DecodingReader<R> {
    inner: R,
    decoder: Decoder,
    guard: Option<GbkGuard>,
    chunk: Vec<u8>,
    out: String,
    pos: usize,
    consumed: u64,
    finished: bool,
}

impl<R: Read> DecodingReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self::with_chunk_size(inner, encoding, CHUNK_BYTES)
    }

    pub fn with_chunk_size(inner: R, encoding: &'static Encoding, chunk_size: usize) -> Self {
        Self {
            inner,
            decoder: encoding.new_decoder_with_bom_removal(),
            guard: (encoding == GBK).then(GbkGuard::default),
            chunk: vec![0; chunk_size.max(1)],
            out: String::new(),
            pos: 0,
            consumed: 0,
            finished: false,
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        self.out.clear();
        self.pos = 0;
        while self.out.is_empty() && !self.finished {
            let n = self.inner.read(&mut self.chunk)?;
            let last = n == 0;
            let src = &self.chunk[..n];

            if let Some(guard) = self.guard.as_mut() {
                guard.feed(src).map_err(|offset| {
                    malformed(format!("byte sequence outside GBK at offset {}", offset))
                })?;
            }

            let needed = self
                .decoder
                .max_utf8_buffer_length_without_replacement(n)
                .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "decode buffer overflow"))?;
            self.out.reserve(needed);
            let (result, read) =
                self.decoder
                    .decode_to_string_without_replacement(src, &mut self.out, last);
            match result {
                DecoderResult::InputEmpty => {}
                DecoderResult::Malformed(bad, _) => {
                    let offset = (self.consumed + read as u64).saturating_sub(bad as u64);
                    return Err(malformed(format!(
                        "malformed {} sequence at offset {}",
                        self.decoder.encoding().name(),
                        offset
                    )));
                }
                DecoderResult::OutputFull => {
                    return Err(io::Error::new(io::ErrorKind::Other, "decode buffer too small"));
                }
            }
            self.consumed += n as u64;
            self.finished = last;
        }
        Ok(())
    }
}

impl<R: Read> Read for DecodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos == self.out.len() {
            self.fill()?;
        }
        let pending = &self.out.as_bytes()[self.pos..];
        let n = pending.len().min(buf.len());
        buf[..n].copy_from_slice(&pending[..n]);
        self.pos += n;
        Ok(n)
    }
}

fn malformed(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// `encoding_rs` decodes the GB18030 superset under the GBK label. This
/// rejects what GBK proper lacks: the single byte 0x80 (and 0xFF) and
/// four-byte sequences, whose second byte is an ASCII digit.
///
/// Only the lead/trail structure is tracked; the decoder still validates
/// the two-byte pairs themselves.
#[derive(Debug, Default)]
struct GbkGuard {
    after_lead: bool,
    offset: u64,
}

impl GbkGuard {
    fn feed(&mut self, bytes: &[u8]) -> Result<(), u64> {
        for &b in bytes {
            if self.after_lead {
                if b.is_ascii_digit() {
                    return Err(self.offset.saturating_sub(1));
                }
                self.after_lead = false;
            } else if b == 0x80 || b == 0xFF {
                return Err(self.offset);
            } else if b > 0x80 {
                self.after_lead = true;
            }
            self.offset += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{GB18030, UTF_8};
    use std::io::Cursor;

    fn decode_all(bytes: &[u8], encoding: &'static Encoding, chunk: usize) -> io::Result<String> {
        let mut out = String::new();
        DecodingReader::with_chunk_size(Cursor::new(bytes.to_vec()), encoding, chunk)
            .read_to_string(&mut out)?;
        Ok(out)
    }

    #[test]
    fn decodes_gbk_across_chunk_boundaries() -> io::Result<()> {
        let (bytes, _, _) = GBK.encode("C1,贴片电阻,0603\n");
        for chunk in [1, 2, 3, 7, 64] {
            assert_eq!(decode_all(&bytes, GBK, chunk)?, "C1,贴片电阻,0603\n");
        }
        Ok(())
    }

    #[test]
    fn four_byte_sequences_are_not_gbk() {
        let bytes = b"A,B,C\n\x81\x30\x81\x30,2,3\n";
        for chunk in [1, 2, 64] {
            let err = decode_all(bytes, GBK, chunk).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData, "chunk {chunk}");
        }
    }

    #[test]
    fn lone_0x80_is_not_gbk() {
        let err = decode_all(b"A,\x80,C\n", GBK, 64).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn digits_after_ascii_are_fine() -> io::Result<()> {
        assert_eq!(decode_all(b"C2,0603,10\n", GBK, 2)?, "C2,0603,10\n");
        Ok(())
    }

    #[test]
    fn gb18030_label_keeps_four_byte_sequences() -> io::Result<()> {
        let out = decode_all(b"\x81\x30\x81\x30", GB18030, 64)?;
        assert_eq!(out.chars().count(), 1);
        Ok(())
    }

    #[test]
    fn truncated_lead_byte_at_eof_is_malformed() {
        let err = decode_all(b"A,B\n\xb5", GBK, 64).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn strips_matching_bom_only() -> io::Result<()> {
        assert_eq!(decode_all(b"\xEF\xBB\xBFA,B\n", UTF_8, 2)?, "A,B\n");
        Ok(())
    }
}
