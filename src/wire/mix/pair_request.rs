//! mixpr: pair request
//!
//! Announces a participant's identity, the amount and script class it wants
//! mixed, how many output slots it occupies, the unspent outputs it
//! commits, and its change output.

use crate::wire::codec::{WireReader, WireWriter};
use crate::wire::error::WireResult;
use crate::wire::message::{WireMessage, CMD_MIX_PAIR_REQ};
use crate::wire::mix::{encode_signed, SignedMessage, IDENTITY_SIZE, SIGNATURE_SIZE};
use crate::wire::protocol::ProtocolVersions;
use crate::wire::tx::{OutPoint, TxOut};
use std::io::{Read, Write};

/// Pair request for a set of unspent outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgMixPR {
    pub signature: [u8; SIGNATURE_SIZE],
    pub identity: [u8; IDENTITY_SIZE],
    pub amount: i64,
    pub script_class: String,
    pub tx_version: u16,
    pub lock_time: u32,
    pub expiry: u32,
    /// Number of mixed outputs this participant occupies
    pub message_count: u32,
    pub utxos: Vec<OutPoint>,
    pub change: TxOut,
}

impl MsgMixPR {
    /// Create an unsigned pair request
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: [u8; IDENTITY_SIZE],
        amount: i64,
        script_class: String,
        tx_version: u16,
        lock_time: u32,
        expiry: u32,
        message_count: u32,
        utxos: Vec<OutPoint>,
        change: TxOut,
    ) -> Self {
        Self {
            signature: [0u8; SIGNATURE_SIZE],
            identity,
            amount,
            script_class,
            tx_version,
            lock_time,
            expiry,
            message_count,
            utxos,
            change,
        }
    }
}

impl WireMessage for MsgMixPR {
    const COMMAND: &'static str = CMD_MIX_PAIR_REQ;

    fn min_version(versions: &ProtocolVersions) -> u32 {
        versions.mix
    }

    fn max_payload_length(&self, _pver: u32, _versions: &ProtocolVersions) -> u32 {
        0
    }

    fn decode_payload<R: Read>(
        r: &mut WireReader<'_, R>,
        _pver: u32,
        _versions: &ProtocolVersions,
    ) -> WireResult<Self> {
        Ok(Self {
            signature: r.read("signature")?,
            identity: r.read("identity")?,
            amount: r.read("amount")?,
            script_class: r.read("script class")?,
            tx_version: r.read("tx version")?,
            lock_time: r.read("lock time")?,
            expiry: r.read("expiry")?,
            message_count: r.read("message count")?,
            utxos: r.read_list("utxos")?,
            change: r.read("change")?,
        })
    }

    fn encode_payload<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        _pver: u32,
        _versions: &ProtocolVersions,
    ) -> WireResult<()> {
        encode_signed(self, w)
    }
}

impl SignedMessage for MsgMixPR {
    fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    fn set_signature(&mut self, signature: [u8; SIGNATURE_SIZE]) {
        self.signature = signature;
    }

    fn identity(&self) -> Option<&[u8; IDENTITY_SIZE]> {
        Some(&self.identity)
    }

    fn encode_signed_fields<W: Write>(&self, w: &mut WireWriter<'_, W>) -> WireResult<()> {
        w.write(&self.identity, "identity")?;
        w.write(&self.amount, "amount")?;
        w.write(&self.script_class, "script class")?;
        w.write(&self.tx_version, "tx version")?;
        w.write(&self.lock_time, "lock time")?;
        w.write(&self.expiry, "expiry")?;
        w.write(&self.message_count, "message count")?;
        w.write_list(&self.utxos, "utxos")?;
        w.write(&self.change, "change")
    }
}
