/*
    Standard script types.

    A locking script is requested with one of the `Locking` variants, each
    carrying exactly the arguments its template needs. Unlocking scripts
    are produced by the `ScriptType` of the output being spent.

        P2PKH         OP_DUP OP_HASH160 <hash160> OP_EQUALVERIFY OP_CHECKSIG
        P2PK          <public key> OP_CHECKSIG
        OP_RETURN     OP_FALSE OP_RETURN <data>...
        Bare multisig OP_<m> <public key>... OP_<n> OP_CHECKMULTISIG
*/

use serde::{Deserialize, Serialize};

use crate::{
    address::address_to_public_key_hash,
    error::{Error, Result},
    key::{PrivKey, PubKey},
    script::{
        builder::{encode_int, encode_pushdata, opcodes, Builder},
        Script
    },
    transaction::SigHash
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptType {
    P2pkh,
    P2pk,
    OpReturn,
    BareMultisig,
    Unknown
}

/**
    Arguments for building a locking script of a particular kind.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locking {
    P2pkh { public_key_hash: [u8; 20] },
    P2pk { public_key: Vec<u8> },
    OpReturn { pushdatas: Vec<Vec<u8>> },
    BareMultisig { participants: Vec<Vec<u8>>, threshold: usize }
}

/**
    Material handed to an unlocking template: DER signatures, the keys that
    produced them and the sighash flag appended to every signature.
*/
#[derive(Debug, Clone, Copy)]
pub struct UnlockingParams<'a> {
    pub signatures: &'a [Vec<u8>],
    pub private_keys: &'a [PrivKey],
    pub sighash: SigHash
}

impl Locking {
    pub fn p2pkh_address(address: &str) -> Result<Self> {
        Ok(Locking::P2pkh { public_key_hash: address_to_public_key_hash(address)? })
    }

    /// Pays to the public key serialized with its own compression flag.
    pub fn p2pk(public_key: &PubKey) -> Self {
        Locking::P2pk { public_key: public_key.serialize() }
    }

    /// Text pushes use their UTF-8 bytes.
    pub fn op_return<I, T>(pushdatas: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>
    {
        Locking::OpReturn {
            pushdatas: pushdatas.into_iter().map(|p| p.as_ref().to_vec()).collect()
        }
    }

    pub fn bare_multisig(participants: &[PubKey], threshold: usize) -> Self {
        Locking::BareMultisig {
            participants: participants.iter().map(|p| p.serialize()).collect(),
            threshold
        }
    }

    pub fn script_type(&self) -> ScriptType {
        match self {
            Locking::P2pkh { .. } => ScriptType::P2pkh,
            Locking::P2pk { .. } => ScriptType::P2pk,
            Locking::OpReturn { .. } => ScriptType::OpReturn,
            Locking::BareMultisig { .. } => ScriptType::BareMultisig
        }
    }

    /**
        Builds the locking script, validating the arguments.
    */
    pub fn script(&self) -> Result<Script> {
        let script = match self {
            Locking::P2pkh { public_key_hash } => Builder::new()
                .push_opcode(opcodes::OP_DUP)
                .push_opcode(opcodes::OP_HASH160)
                .push_data(public_key_hash)?
                .push_opcode(opcodes::OP_EQUALVERIFY)
                .push_opcode(opcodes::OP_CHECKSIG)
                .into_script(),

            Locking::P2pk { public_key } => {
                PubKey::from_slice(public_key)?;
                Builder::new()
                    .push_data(public_key)?
                    .push_opcode(opcodes::OP_CHECKSIG)
                    .into_script()
            },

            Locking::OpReturn { pushdatas } => {
                let mut builder = Builder::new()
                    .push_opcode(opcodes::OP_FALSE)
                    .push_opcode(opcodes::OP_RETURN);
                for pushdata in pushdatas {
                    builder = builder.push_data(pushdata)?;
                }
                builder.into_script()
            },

            Locking::BareMultisig { participants, threshold } => {
                if *threshold < 1 || *threshold > participants.len() {
                    return Err(Error::InvalidScript(format!(
                        "bad threshold {} for {} participants", threshold, participants.len()
                    )))
                }
                let mut builder = Builder::new().push_int(*threshold as i64);
                for public_key in participants {
                    PubKey::from_slice(public_key)?;
                    builder = builder.push_data(public_key)?;
                }
                builder
                    .push_int(participants.len() as i64)
                    .push_opcode(opcodes::OP_CHECKMULTISIG)
                    .into_script()
            }
        };
        Ok(script)
    }
}

fn signature_push(signature: &[u8], sighash: SigHash) -> Result<Vec<u8>> {
    let mut data = signature.to_vec();
    data.push(sighash.to_u8());
    encode_pushdata(&data, true)
}

impl ScriptType {
    /**
        Builds the unlocking script for an output of this type.
    */
    pub fn unlocking(&self, params: &UnlockingParams) -> Result<Script> {
        match self {
            ScriptType::P2pkh => {
                let signature = params.signatures.first()
                    .ok_or_else(|| Error::InvalidScript("P2PKH unlocking needs a signature".to_string()))?;
                let key = params.private_keys.first()
                    .ok_or_else(|| Error::InvalidScript("P2PKH unlocking needs a private key".to_string()))?;

                let mut code = signature_push(signature, params.sighash)?;
                code.extend(encode_pushdata(&key.public_key().serialize(), true)?);
                Ok(Script::new(code))
            },

            ScriptType::P2pk => {
                let signature = params.signatures.first()
                    .ok_or_else(|| Error::InvalidScript("P2PK unlocking needs a signature".to_string()))?;
                Ok(Script::new(signature_push(signature, params.sighash)?))
            },

            ScriptType::BareMultisig => {
                // Extra element consumed by OP_CHECKMULTISIG
                let mut code = vec![opcodes::OP_0.into_u8()];
                for signature in params.signatures {
                    code.extend(signature_push(signature, params.sighash)?);
                }
                Ok(Script::new(code))
            },

            ScriptType::OpReturn => Err(Error::Unsupported("OP_RETURN cannot be unlocked".to_string())),
            ScriptType::Unknown => Err(Error::Unsupported("unknown script type cannot be unlocked".to_string()))
        }
    }

    /**
        Upper bound of the unlocking script size, used for fee estimation before signing.
    */
    pub fn estimated_unlocking_byte_length(&self, private_keys: &[PrivKey]) -> Result<usize> {
        match self {
            ScriptType::P2pkh => {
                let key = private_keys.first()
                    .ok_or_else(|| Error::InvalidScript("P2PKH estimate needs a private key".to_string()))?;
                Ok(if key.compressed { 107 } else { 139 })
            },
            ScriptType::P2pk => Ok(73),
            ScriptType::BareMultisig => Ok(1 + 73 * private_keys.len()),
            ScriptType::OpReturn => Err(Error::Unsupported("OP_RETURN cannot be unlocked".to_string())),
            ScriptType::Unknown => Err(Error::Unsupported("unknown script type cannot be unlocked".to_string()))
        }
    }

    /**
        Recognises the standard locking templates by their byte layout.
    */
    pub fn classify(locking_script: &Script) -> ScriptType {
        let code = locking_script.as_bytes();

        match code {
            [0x76, 0xa9, 0x14, .., 0x88, 0xac] if code.len() == 25 => ScriptType::P2pkh,
            [0x21, .., 0xac] if code.len() == 35 => ScriptType::P2pk,
            [0x41, .., 0xac] if code.len() == 67 => ScriptType::P2pk,
            [0x00, 0x6a, ..] | [0x6a, ..] => ScriptType::OpReturn,
            [.., 0xae] if is_bare_multisig(code) => ScriptType::BareMultisig,
            _ => ScriptType::Unknown
        }
    }
}

/// OP_1..OP_16, or a one byte push for counts of 17 and up.
fn is_count(push: &[u8]) -> bool {
    matches!(push, [0x51..=0x60] | [0x01, 0x11..=0x7f])
}

/// m <keys> n OP_CHECKMULTISIG, with m and n read from either end.
fn is_bare_multisig(code: &[u8]) -> bool {
    let body = match code.split_last() {
        Some((0xae, body)) if body.len() >= 2 => body,
        _ => return false
    };
    let has_m = (1..=2).any(|len| body.get(..len).map_or(false, is_count));
    let has_n = (1..=2).any(|len| body.len().checked_sub(len).map_or(false, |start| is_count(&body[start..])));
    has_m && has_n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        script::builder::encode_pushdata,
        util::Network
    };

    const ADDRESS: &str = "1AfxgwYJrBgriZDLryfyKuSdBsi59jeBX9";
    const P2PKH_LOCKING: &str = "76a9146a176cd51593e00542b8e1958b7da2be97452d0588ac";
    const WIF_COMPRESSED: &str = "L5agPjZKceSTkhqZF2dmFptT5LFrbr6ZGPvP7u4A6dvhTrr71WZ9";
    const WIF_UNCOMPRESSED: &str = "5KiANv9EHEU4o9oLzZ6A7z4xJJ3uvfK2RLEubBtTz1fSwAbpJ2U";

    #[test]
    fn p2pkh() -> Result<()> {
        let script = Locking::p2pkh_address(ADDRESS)?.script()?;
        assert_eq!(script.hex(), P2PKH_LOCKING);

        let hash = address_to_public_key_hash(ADDRESS)?;
        assert_eq!(Locking::P2pkh { public_key_hash: hash }.script()?, script);
        assert_eq!(ScriptType::classify(&script), ScriptType::P2pkh);

        let compressed = PrivKey::from_wif(WIF_COMPRESSED)?;
        let uncompressed = PrivKey::from_wif(WIF_UNCOMPRESSED)?;
        assert_eq!(ScriptType::P2pkh.estimated_unlocking_byte_length(&[compressed.clone()])?, 107);
        assert_eq!(ScriptType::P2pkh.estimated_unlocking_byte_length(&[uncompressed])?, 139);
        assert!(ScriptType::P2pkh.estimated_unlocking_byte_length(&[]).is_err());

        let signatures = vec![vec![0x00]];
        let keys = vec![compressed.clone()];
        let params = UnlockingParams { signatures: &signatures, private_keys: &keys, sighash: SigHash::ALL };
        assert_eq!(
            ScriptType::P2pkh.unlocking(&params)?.hex(),
            format!("02004121{}", compressed.public_key().hex())
        );
        Ok(())
    }

    #[test]
    fn op_return() -> Result<()> {
        assert_eq!(Locking::op_return(["0"]).script()?.hex(), "006a0130");
        assert_eq!(
            Locking::op_return(["0".repeat(0x4b)]).script()?.hex(),
            format!("006a4b{}", "30".repeat(0x4b))
        );
        assert_eq!(
            Locking::op_return(["0".repeat(0x4c)]).script()?.hex(),
            format!("006a4c4c{}", "30".repeat(0x4c))
        );
        assert_eq!(
            Locking::op_return(["0".repeat(0x100)]).script()?.hex(),
            format!("006a4d0001{}", "30".repeat(0x100))
        );
        let mixed: Vec<Vec<u8>> = vec![vec![0x31, 0x32], b"345".to_vec()];
        let script = Locking::op_return(mixed).script()?;
        assert_eq!(script.hex(), "006a02313203333435");
        assert_eq!(ScriptType::classify(&script), ScriptType::OpReturn);

        let params = UnlockingParams { signatures: &[], private_keys: &[], sighash: SigHash::ALL };
        assert!(matches!(ScriptType::OpReturn.unlocking(&params), Err(Error::Unsupported(_))));
        assert!(ScriptType::OpReturn.estimated_unlocking_byte_length(&[]).is_err());
        Ok(())
    }

    #[test]
    fn p2pk() -> Result<()> {
        let public_key = PrivKey::from_wif(WIF_COMPRESSED)?.public_key();
        let script = Locking::p2pk(&public_key).script()?;
        assert_eq!(script.hex(), format!("21{}ac", public_key.hex()));
        assert_eq!(ScriptType::classify(&script), ScriptType::P2pk);

        let uncompressed = Locking::P2pk { public_key: public_key.serialize_with(false) }.script()?;
        assert_eq!(ScriptType::classify(&uncompressed), ScriptType::P2pk);
        assert!(Locking::P2pk { public_key: vec![0x02; 33] }.script().is_err());

        let signatures = vec![vec![0x00]];
        let params = UnlockingParams { signatures: &signatures, private_keys: &[], sighash: SigHash::ALL };
        assert_eq!(ScriptType::P2pk.unlocking(&params)?.hex(), "020041");
        assert_eq!(ScriptType::P2pk.estimated_unlocking_byte_length(&[])?, 73);
        Ok(())
    }

    #[test]
    fn bare_multisig() -> Result<()> {
        let keys: Vec<PrivKey> = (0..3).map(|_| PrivKey::new_rand(Network::Mainnet)).collect();
        let mut participants: Vec<PubKey> = keys.iter().map(|k| k.public_key()).collect();
        participants[1].compressed = false;

        let mut expected = encode_int(2);
        for participant in participants.iter() {
            expected.extend(encode_pushdata(&participant.serialize(), true)?);
        }
        expected.extend(encode_int(3));
        expected.push(0xae);

        let script = Locking::bare_multisig(&participants, 2).script()?;
        assert_eq!(script.serialize(), expected);
        assert_eq!(ScriptType::classify(&script), ScriptType::BareMultisig);

        assert!(Locking::bare_multisig(&participants, 0).script().is_err());
        assert!(Locking::bare_multisig(&participants, 4).script().is_err());

        let signatures = vec![vec![0x00], vec![0x01]];
        let params = UnlockingParams { signatures: &signatures, private_keys: &keys[..2], sighash: SigHash::ALL };
        assert_eq!(ScriptType::BareMultisig.unlocking(&params)?.hex(), "00020041020141");
        assert_eq!(ScriptType::BareMultisig.estimated_unlocking_byte_length(&keys[..2])?, 147);
        Ok(())
    }

    #[test]
    fn large_bare_multisig() -> Result<()> {
        let participants: Vec<PubKey> = (1..=17)
            .map(|k| PrivKey::from_int(k.into(), Network::Mainnet).map(|key| key.public_key()))
            .collect::<Result<_>>()?;

        for threshold in [2, 17] {
            let script = Locking::bare_multisig(&participants, threshold).script()?;
            let code = script.as_bytes();
            assert_eq!(&code[code.len() - 3..], &[0x01, 0x11, 0xae]);
            assert_eq!(ScriptType::classify(&script), ScriptType::BareMultisig);
        }
        Ok(())
    }

    #[test]
    fn p2pkh_from_key_equals_p2pkh_from_address() -> Result<()> {
        let key = PrivKey::from_wif(WIF_COMPRESSED)?;
        let from_key = key.locking_script()?;
        let from_address = Locking::p2pkh_address(&key.address())?.script()?;

        assert_eq!(from_key, from_address);
        assert_eq!(from_key.hex(), P2PKH_LOCKING);
        assert_ne!(from_key, PrivKey::from_wif(WIF_UNCOMPRESSED)?.locking_script()?);
        Ok(())
    }

    #[test]
    fn unknown_scripts() {
        assert_eq!(ScriptType::classify(&Script::new(vec![0x51])), ScriptType::Unknown);
        assert_eq!(ScriptType::classify(&Script::default()), ScriptType::Unknown);
        assert_eq!(ScriptType::classify(&Script::new(vec![0x51, 0xae])), ScriptType::Unknown);
        // a two byte push is not a count
        assert_eq!(ScriptType::classify(&Script::new(vec![0x51, 0x02, 0x11, 0x00, 0xae])), ScriptType::Unknown);
        assert!(ScriptType::Unknown.estimated_unlocking_byte_length(&[]).is_err());
    }
}
