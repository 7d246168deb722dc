//! Transaction elements referenced by mixing pair requests

use crate::wire::codec::{Element, WireReader, WireWriter};
use crate::wire::error::WireResult;
use std::io::{Read, Write};

/// Reference to a previous transaction output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Hash of the transaction holding the output
    pub hash: [u8; 32],
    /// Output index within that transaction
    pub index: u32,
    /// Transaction tree the output lives in
    pub tree: i8,
}

impl OutPoint {
    pub fn new(hash: [u8; 32], index: u32, tree: i8) -> Self {
        Self { hash, index, tree }
    }
}

impl Element for OutPoint {
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self> {
        Ok(Self {
            hash: r.read(field)?,
            index: r.read(field)?,
            tree: r.read(field)?,
        })
    }

    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()> {
        w.write(&self.hash, field)?;
        w.write(&self.index, field)?;
        w.write(&self.tree, field)
    }
}

/// A transaction output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOut {
    /// Amount in atoms
    pub value: i64,
    /// Script version
    pub version: u16,
    /// Public key script
    pub pk_script: Vec<u8>,
}

impl TxOut {
    pub fn new(value: i64, version: u16, pk_script: Vec<u8>) -> Self {
        Self {
            value,
            version,
            pk_script,
        }
    }
}

impl Element for TxOut {
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self> {
        Ok(Self {
            value: r.read(field)?,
            version: r.read(field)?,
            pk_script: r.read(field)?,
        })
    }

    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()> {
        w.write(&self.value, field)?;
        w.write(&self.version, field)?;
        w.write(&self.pk_script, field)
    }
}
