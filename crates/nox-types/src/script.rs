//! Minimal script building.
//!
//! Only the script *construction* needed by block assembly lives here: the
//! coinbase signature script, the OP_RETURN commitment output and the
//! standard payment scripts. Script execution is the consensus engine's
//! concern and is not implemented in this crate.

use crate::error::ScriptError;

/// Empty push.
pub const OP_0: u8 = 0x00;
/// Push the next byte as a length-prefixed element.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Push with a 2-byte little-endian length prefix.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Push with a 4-byte little-endian length prefix.
pub const OP_PUSHDATA4: u8 = 0x4e;
/// Push the number -1.
pub const OP_1NEGATE: u8 = 0x4f;
/// Push the number 1. Doubles as OP_TRUE.
pub const OP_1: u8 = 0x51;
/// Push the number 16.
pub const OP_16: u8 = 0x60;
/// Marks an output as an unspendable data carrier.
pub const OP_RETURN: u8 = 0x6a;
/// Duplicate the top stack item.
pub const OP_DUP: u8 = 0x76;
/// Compare the top two items, fail the script on mismatch.
pub const OP_EQUALVERIFY: u8 = 0x88;
/// Hash the top item with the address digest.
pub const OP_HASH160: u8 = 0xa9;
/// Single signature check.
pub const OP_CHECKSIG: u8 = 0xac;
/// Single signature check that fails the script.
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
/// Multi-signature check.
pub const OP_CHECKMULTISIG: u8 = 0xae;
/// Multi-signature check that fails the script.
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

/// Maximum serialized script size.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum size of a single pushed element.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Tag appended to the standard coinbase script after height and nonce.
const COINBASE_SCRIPT_TAG: &[u8] = b"/nox/";

/// A pay-to destination, identified by its 20-byte script hash.
///
/// Address string encoding and key derivation live in the key tooling; block
/// assembly only needs the hash to emit the payment script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    script_hash: [u8; 20],
}

impl Address {
    /// Create an address from a 20-byte script hash.
    pub fn new(script_hash: [u8; 20]) -> Self {
        Self { script_hash }
    }

    /// The script hash this address pays to.
    pub fn script_hash(&self) -> &[u8; 20] {
        &self.script_hash
    }

    /// Standard pay-to-address output script.
    pub fn pk_script(&self) -> Vec<u8> {
        let mut script = Vec::with_capacity(25);
        script.push(OP_DUP);
        script.push(OP_HASH160);
        script.push(20);
        script.extend_from_slice(&self.script_hash);
        script.push(OP_EQUALVERIFY);
        script.push(OP_CHECKSIG);
        script
    }
}

/// Incremental script builder with minimal-push encoding.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a raw opcode.
    pub fn push_op(mut self, op: u8) -> Self {
        self.script.push(op);
        self
    }

    /// Push an integer using the minimal script-number encoding:
    /// small values map to the dedicated opcodes, larger values are pushed
    /// as little-endian bytes with an explicit sign bit.
    pub fn push_int(mut self, n: i64) -> Self {
        if n == 0 {
            self.script.push(OP_0);
            return self;
        }
        if n == -1 {
            self.script.push(OP_1NEGATE);
            return self;
        }
        if (1..=16).contains(&n) {
            self.script.push(OP_1 + (n as u8 - 1));
            return self;
        }
        self.push_data_raw(&script_num_bytes(n))
    }

    /// Push a data element with the shortest possible push opcode.
    pub fn push_data(mut self, data: &[u8]) -> Self {
        if data.is_empty() {
            self.script.push(OP_0);
            return self;
        }
        if data.len() == 1 && (data[0] == 0 || (1..=16).contains(&data[0])) {
            return self.push_int(data[0] as i64);
        }
        self.push_data_raw(data)
    }

    fn push_data_raw(mut self, data: &[u8]) -> Self {
        let len = data.len();
        if len < OP_PUSHDATA1 as usize {
            self.script.push(len as u8);
        } else if len <= 0xff {
            self.script.push(OP_PUSHDATA1);
            self.script.push(len as u8);
        } else if len <= 0xffff {
            self.script.push(OP_PUSHDATA2);
            self.script.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.script.push(OP_PUSHDATA4);
            self.script.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.script.extend_from_slice(data);
        self
    }

    /// Finish the script, enforcing the size limits.
    pub fn build(self) -> Result<Vec<u8>, ScriptError> {
        if self.script.len() > MAX_SCRIPT_SIZE {
            return Err(ScriptError::ScriptTooLarge {
                size: self.script.len(),
                max: MAX_SCRIPT_SIZE,
            });
        }
        Ok(self.script)
    }
}

/// Minimal little-endian script-number encoding with explicit sign bit.
fn script_num_bytes(n: i64) -> Vec<u8> {
    let negative = n < 0;
    let mut abs = n.unsigned_abs();
    let mut bytes = Vec::with_capacity(9);
    while abs > 0 {
        bytes.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    // The most significant bit carries the sign; extend by a byte when the
    // magnitude already uses it.
    if bytes.last().map_or(false, |b| b & 0x80 != 0) {
        bytes.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        let last = bytes.len() - 1;
        bytes[last] |= 0x80;
    }
    bytes
}

/// Standard coinbase signature script: the next block height followed by the
/// entropy nonce and the node tag. The nonce keeps the coinbase hash, and
/// with it the Merkle root, unique across candidate blocks.
pub fn standard_coinbase_script(height: u64, extra_nonce: u64) -> Result<Vec<u8>, ScriptError> {
    ScriptBuilder::new()
        .push_int(height as i64)
        .push_data(&extra_nonce.to_le_bytes())
        .push_data(COINBASE_SCRIPT_TAG)
        .build()
}

/// Standard OP_RETURN commitment script carrying `payload`.
pub fn standard_coinbase_opreturn(payload: &[u8]) -> Result<Vec<u8>, ScriptError> {
    if payload.len() > MAX_SCRIPT_ELEMENT_SIZE {
        return Err(ScriptError::ElementTooLarge {
            size: payload.len(),
            max: MAX_SCRIPT_ELEMENT_SIZE,
        });
    }
    ScriptBuilder::new()
        .push_op(OP_RETURN)
        .push_data(payload)
        .build()
}

/// Output script redeemable by anyone, used when no pay address is
/// configured and external mining software supplies its own coinbase.
pub fn anyone_can_spend_script() -> Vec<u8> {
    vec![OP_1]
}

/// Whether an output script is provably unspendable and may be omitted from
/// the UTXO view.
pub fn is_unspendable(pk_script: &[u8]) -> bool {
    (!pk_script.is_empty() && pk_script[0] == OP_RETURN) || pk_script.len() > MAX_SCRIPT_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_int_small_values() {
        let script = ScriptBuilder::new().push_int(0).push_int(1).push_int(16).build().unwrap();
        assert_eq!(script, vec![OP_0, OP_1, OP_16]);
    }

    #[test]
    fn test_push_int_negative_one() {
        let script = ScriptBuilder::new().push_int(-1).build().unwrap();
        assert_eq!(script, vec![OP_1NEGATE]);
    }

    #[test]
    fn test_push_int_large_value() {
        // 0x80 needs a sign-extension byte.
        let script = ScriptBuilder::new().push_int(128).build().unwrap();
        assert_eq!(script, vec![0x02, 0x80, 0x00]);
    }

    #[test]
    fn test_push_int_negative_value() {
        let script = ScriptBuilder::new().push_int(-5_000).build().unwrap();
        assert_eq!(script, vec![0x02, 0x88, 0x93]);
    }

    #[test]
    fn test_push_data_lengths() {
        let small = ScriptBuilder::new().push_data(&[7u8; 75]).build().unwrap();
        assert_eq!(small[0], 75);

        let medium = ScriptBuilder::new().push_data(&[7u8; 76]).build().unwrap();
        assert_eq!(medium[0], OP_PUSHDATA1);
        assert_eq!(medium[1], 76);

        let large = ScriptBuilder::new().push_data(&[7u8; 300]).build().unwrap();
        assert_eq!(large[0], OP_PUSHDATA2);
    }

    #[test]
    fn test_script_size_limit() {
        let result = ScriptBuilder::new()
            .push_data(&vec![0u8; 6000])
            .push_data(&vec![0u8; 6000])
            .build();
        assert!(matches!(result, Err(ScriptError::ScriptTooLarge { .. })));
    }

    #[test]
    fn test_coinbase_script_varies_with_nonce() {
        let a = standard_coinbase_script(100, 1).unwrap();
        let b = standard_coinbase_script(100, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_coinbase_script_ends_with_tag() {
        let script = standard_coinbase_script(100, 99).unwrap();
        assert!(script.ends_with(COINBASE_SCRIPT_TAG));
    }

    #[test]
    fn test_opreturn_is_unspendable() {
        let script = standard_coinbase_opreturn(&[]).unwrap();
        assert_eq!(script[0], OP_RETURN);
        assert!(is_unspendable(&script));
    }

    #[test]
    fn test_opreturn_payload_limit() {
        let result = standard_coinbase_opreturn(&vec![0u8; MAX_SCRIPT_ELEMENT_SIZE + 1]);
        assert!(matches!(result, Err(ScriptError::ElementTooLarge { .. })));
    }

    #[test]
    fn test_anyone_can_spend_is_spendable() {
        assert!(!is_unspendable(&anyone_can_spend_script()));
    }

    #[test]
    fn test_pay_to_address_script_shape() {
        let addr = Address::new([0xab; 20]);
        let script = addr.pk_script();
        assert_eq!(script.len(), 25);
        assert_eq!(script[0], OP_DUP);
        assert_eq!(script[24], OP_CHECKSIG);
    }
}
