//! Canonical binary record codec.
//!
//! Layout: version(1) ‖ inputCount(1) ‖ inputs(34 bytes each: hash, index,
//! reserved zero) ‖ outputCount(1) ‖ outputs(address 33, amount width 1,
//! amount LE, kind 1) ‖ messageFlag(1) [‖ length u16-LE ‖ UTF-8 bytes]
//! [‖ r(32) ‖ s(32)]. Output amounts use their minimal byte width; the
//! decoder reads the explicit width prefix rather than assuming one.
//! Message length counts UTF-8 bytes, not characters.

use crate::types::{RecordSignature, TransactionRecord, TxInput, TxOutput};
use crate::TxError;
use upow_types::address::ADDRESS_LEN;
use upow_types::amount;
use upow_types::constants::{MAX_TX_INPUTS, MAX_TX_OUTPUTS};
use upow_types::{Address, OutputKind};

/// Serialize a record to its canonical bytes.
pub fn encode(record: &TransactionRecord) -> Result<Vec<u8>, TxError> {
    if record.inputs.len() > MAX_TX_INPUTS {
        return Err(TxError::TooManyInputs { limit: MAX_TX_INPUTS });
    }
    if record.outputs.len() > MAX_TX_OUTPUTS {
        return Err(TxError::TooManyOutputs { limit: MAX_TX_OUTPUTS });
    }

    let mut out = Vec::new();
    out.push(record.version);

    out.push(record.inputs.len() as u8);
    for input in &record.inputs {
        out.extend_from_slice(&input.tx_hash);
        out.push(input.index);
        out.push(0); // reserved
    }

    out.push(record.outputs.len() as u8);
    for output in &record.outputs {
        out.extend_from_slice(output.address.as_bytes());
        let width = amount::minimal_byte_width(&output.amount)?;
        out.push(width as u8);
        out.extend_from_slice(&amount::encode_le(&output.amount, width));
        out.push(output.kind as u8);
    }

    match record.message.as_deref() {
        Some(msg) if !msg.is_empty() => {
            let bytes = msg.as_bytes();
            if bytes.len() > u16::MAX as usize {
                return Err(TxError::MessageTooLong);
            }
            out.push(1);
            out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        _ => out.push(0),
    }

    if let Some(sig) = &record.signature {
        out.extend_from_slice(&sig.r);
        out.extend_from_slice(&sig.s);
    }

    Ok(out)
}

/// Serialize a record to its hex string form.
pub fn encode_hex(record: &TransactionRecord) -> Result<String, TxError> {
    encode(record).map(hex::encode)
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], TxError> {
        if self.pos + n > self.data.len() {
            return Err(TxError::Truncated(field));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn byte(&mut self, field: &'static str) -> Result<u8, TxError> {
        Ok(self.take(1, field)?[0])
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// Parse a record from bytes. Exact inverse of [`encode`].
pub fn decode(data: &[u8]) -> Result<TransactionRecord, TxError> {
    let mut r = Reader::new(data);

    let version = r.byte("version")?;

    let input_count = r.byte("input count")? as usize;
    let mut inputs = Vec::with_capacity(input_count);
    for _ in 0..input_count {
        let hash = r.take(32, "input tx hash")?;
        let index = r.byte("input index")?;
        let _reserved = r.byte("input reserved byte")?;
        let mut tx_hash = [0u8; 32];
        tx_hash.copy_from_slice(hash);
        inputs.push(TxInput { tx_hash, index });
    }

    let output_count = r.byte("output count")? as usize;
    let mut outputs = Vec::with_capacity(output_count);
    for _ in 0..output_count {
        let address = Address::from_bytes(r.take(ADDRESS_LEN, "output address")?)?;
        let width = r.byte("output amount width")? as usize;
        let value = amount::decode_le(r.take(width, "output amount")?);
        let kind_byte = r.byte("output kind")?;
        let kind = OutputKind::from_u8(kind_byte).ok_or(TxError::UnknownOutputKind(kind_byte))?;
        outputs.push(TxOutput { address, amount: value, kind });
    }

    // The message section exists only when bytes remain past the outputs.
    let mut message = None;
    if r.remaining() > 0 {
        let flag = r.byte("message flag")?;
        if flag == 1 {
            let len_bytes = r.take(2, "message length")?;
            let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
            let bytes = r.take(len, "message body")?;
            let text =
                std::str::from_utf8(bytes).map_err(|_| TxError::Truncated("message body"))?;
            message = Some(text.to_string());
        }
    }

    // Anything left must be the 64-byte signature, treated as opaque.
    let signature = match r.remaining() {
        0 => None,
        64 => {
            let mut sig = RecordSignature { r: [0u8; 32], s: [0u8; 32] };
            sig.r.copy_from_slice(r.take(32, "signature r")?);
            sig.s.copy_from_slice(r.take(32, "signature s")?);
            Some(sig)
        }
        _ => return Err(TxError::Truncated("signature")),
    };

    Ok(TransactionRecord {
        version,
        inputs,
        outputs,
        message,
        signature,
    })
}

/// Parse a record from its hex string form.
pub fn decode_hex(s: &str) -> Result<TransactionRecord, TxError> {
    let bytes = hex::decode(s.trim()).map_err(|_| TxError::MalformedHex)?;
    decode(&bytes)
}
