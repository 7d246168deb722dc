//! CLI commands for inspecting wire messages
//!
//! Implements all command handlers for the CLI interface. Handlers that
//! produce data build a JSON value first so the output can be checked
//! without capturing stdout.

use crate::addrmgr::AddressInfo;
use crate::crypto::{PayloadSigner, SchnorrSigner, SchnorrVerifier};
use crate::wire::{
    Message, MsgAddrV2, NetAddressV2, OutPoint, ProtocolVersions, ServiceFlags, SignedMessage,
    TxOut, WireMessage,
};
use serde_json::{json, Value};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Threshold overrides given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionOverrides {
    pub addr_v2: Option<u32>,
    pub tor_v3_relay: Option<u32>,
    pub mix: Option<u32>,
}

/// Build the effective protocol thresholds
///
/// Starts from `file` when given, otherwise the defaults, then applies
/// the overrides and validates the result.
pub fn resolve_versions(
    file: Option<&Path>,
    overrides: VersionOverrides,
) -> CliResult<ProtocolVersions> {
    let mut versions = match file {
        Some(path) => ProtocolVersions::load(path)?,
        None => ProtocolVersions::default(),
    };

    if let Some(v) = overrides.addr_v2 {
        versions.addr_v2 = v;
    }
    if let Some(v) = overrides.tor_v3_relay {
        versions.tor_v3_relay = v;
    }
    if let Some(v) = overrides.mix {
        versions.mix = v;
    }

    versions.validate()?;
    Ok(versions)
}

fn print_json(value: &Value) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Decode
// =============================================================================

/// Decode a hex payload and describe it
pub fn decode_summary(
    versions: &ProtocolVersions,
    command: &str,
    pver: u32,
    payload_hex: &str,
    verify: bool,
) -> CliResult<Value> {
    let bytes = hex::decode(payload_hex.trim())?;
    let (msg, consumed) = Message::from_bytes(command, &bytes, pver, versions)?;

    if consumed < bytes.len() {
        log::warn!(
            "{} trailing bytes after {} payload",
            bytes.len() - consumed,
            msg.command()
        );
    }

    let verifier = SchnorrVerifier::new();
    let verifier = if verify { Some(&verifier) } else { None };

    Ok(json!({
        "command": msg.command(),
        "type": msg.type_name(),
        "protocol_version": pver,
        "consumed": consumed,
        "trailing": bytes.len() - consumed,
        "payload_sha256": crate::crypto::sha256_hex(&bytes[..consumed]),
        "max_payload": msg.max_payload_length(pver, versions),
        "message": message_summary(&msg, verifier),
    }))
}

/// Decode a hex payload and print its summary
pub fn cmd_decode(
    versions: &ProtocolVersions,
    command: &str,
    pver: u32,
    payload_hex: &str,
    verify: bool,
) -> CliResult<()> {
    print_json(&decode_summary(versions, command, pver, payload_hex, verify)?)
}

fn message_summary(msg: &Message, verifier: Option<&SchnorrVerifier>) -> Value {
    match msg {
        Message::AddrV2(m) => json!({
            "count": m.len(),
            "addresses": m.addresses().iter().map(record_summary).collect::<Vec<_>>(),
        }),
        Message::MixPairReq(m) => with_signature(
            m,
            verifier,
            json!({
                "identity": hex::encode(m.identity),
                "amount": m.amount,
                "script_class": m.script_class,
                "tx_version": m.tx_version,
                "lock_time": m.lock_time,
                "expiry": m.expiry,
                "message_count": m.message_count,
                "utxos": m.utxos.iter().map(outpoint_summary).collect::<Vec<_>>(),
                "change": txout_summary(&m.change),
            }),
        ),
        Message::MixKeyExchange(m) => with_signature(
            m,
            verifier,
            json!({
                "identity": hex::encode(m.identity),
                "run": m.run,
                "ecdh": hex::encode(m.ecdh),
                "commitment": hex::encode(m.commitment),
                "seen_prs": m.seen_prs.iter().map(hex::encode).collect::<Vec<_>>(),
                "pqpk_sha256": crate::crypto::sha256_hex(&m.pqpk[..]),
            }),
        ),
        Message::MixCiphertexts(m) => with_signature(
            m,
            verifier,
            json!({
                "ciphertexts": m.ciphertexts.len(),
            }),
        ),
        Message::MixSlotReserve(m) => with_signature(
            m,
            verifier,
            json!({
                "run": m.run,
                "dc_mix": m.dc_mix.iter().map(hex::encode).collect::<Vec<_>>(),
            }),
        ),
        Message::MixDcNet(m) => with_signature(
            m,
            verifier,
            json!({
                "run": m.run,
                "dc_net": m.dc_net.iter().map(|v| json!({
                    "n": v.n,
                    "msize": v.msize,
                    "data": hex::encode(&v.data),
                })).collect::<Vec<_>>(),
                "reveal_secrets": m.reveal_secrets,
            }),
        ),
        Message::MixConfirm(m) => with_signature(
            m,
            verifier,
            json!({
                "reveal_secrets": m.reveal_secrets,
                "mix": hex::encode(&m.mix),
            }),
        ),
    }
}

/// Add the signature and, when requested, its check against the claimed identity
fn with_signature<M: SignedMessage>(
    msg: &M,
    verifier: Option<&SchnorrVerifier>,
    mut fields: Value,
) -> Value {
    if let Value::Object(map) = &mut fields {
        map.insert("signature".into(), json!(hex::encode(msg.signature())));
        if let (Some(verifier), Some(_)) = (verifier, msg.identity()) {
            map.insert("signature_valid".into(), json!(msg.verify_claimed(verifier)));
        }
    }
    fields
}

fn record_summary(record: &NetAddressV2) -> Value {
    let address = match record.ip_addr() {
        Some(ip) => ip.to_string(),
        None => hex::encode(&record.addr),
    };

    json!({
        "type": record.kind.to_string(),
        "address": address,
        "port": record.port,
        "services": record.services.bits(),
        "timestamp": record.timestamp,
        "last_seen": record.last_seen().map(|t| t.to_rfc3339()),
        "group": AddressInfo::from_record(record).map(|info| info.group),
    })
}

fn outpoint_summary(op: &OutPoint) -> Value {
    json!({
        "hash": hex::encode(op.hash),
        "index": op.index,
        "tree": op.tree,
    })
}

fn txout_summary(out: &TxOut) -> Value {
    json!({
        "value": out.value,
        "version": out.version,
        "pk_script": hex::encode(&out.pk_script),
    })
}

// =============================================================================
// Encode
// =============================================================================

/// Build an address list from `ip:port` strings and encode it
pub fn encode_addrs(
    versions: &ProtocolVersions,
    pver: u32,
    addrs: &[String],
    services: u64,
) -> CliResult<String> {
    let services = ServiceFlags::from_bits_retain(services);
    let records = addrs
        .iter()
        .map(|s| -> CliResult<NetAddressV2> {
            let addr: SocketAddr = s.parse()?;
            Ok(NetAddressV2::from_ip(addr.ip(), addr.port(), services))
        })
        .collect::<CliResult<Vec<_>>>()?;

    let mut msg = MsgAddrV2::new();
    msg.add_many(records)?;
    Ok(hex::encode(msg.to_bytes(pver, versions)?))
}

/// Encode an address list and print the payload hex
pub fn cmd_encode_addrs(
    versions: &ProtocolVersions,
    pver: u32,
    addrs: &[String],
    services: u64,
) -> CliResult<()> {
    println!("{}", encode_addrs(versions, pver, addrs, services)?);
    Ok(())
}

// =============================================================================
// Classify / Keys / Versions
// =============================================================================

/// Classify each address
pub fn classify_summary(addrs: &[String]) -> CliResult<Value> {
    let infos = addrs
        .iter()
        .map(|s| -> CliResult<AddressInfo> { Ok(AddressInfo::new(s.parse::<IpAddr>()?)) })
        .collect::<CliResult<Vec<_>>>()?;
    Ok(serde_json::to_value(infos)?)
}

/// Classify each address and print the results
pub fn cmd_classify(addrs: &[String]) -> CliResult<()> {
    print_json(&classify_summary(addrs)?)
}

/// Generate a mixing session identity
pub fn cmd_keygen() -> CliResult<()> {
    let signer = SchnorrSigner::generate();

    println!("🔑 New mixing identity");
    println!("   ├─ Identity: {}", hex::encode(signer.identity()));
    println!("   └─ Private key: {}", signer.private_key_hex());

    Ok(())
}

/// Print the effective protocol thresholds
pub fn cmd_versions(versions: &ProtocolVersions) -> CliResult<()> {
    print_json(&serde_json::to_value(versions)?)
}
