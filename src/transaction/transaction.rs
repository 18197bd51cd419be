/*
    Transaction assembly, BIP143 (fork id) digests, signing and fees.

    Lifecycle: inputs and outputs are added, every input is digested and
    signed according to its script type, change is added, then the raw
    transaction is serialized and handed to a provider.
*/

use log::{debug, trace};

use crate::{
    config::Settings,
    error::{Error, Result},
    hash::hash256,
    provider::{BroadcastResult, Provider},
    script::{ScriptType, UnlockingParams},
    transaction::{
        reader::ByteReader,
        TxInput,
        TxOutput,
        Txid,
        Unspent
    },
    util::encode_varint
};

// Bytes of an input besides its unlocking script: outpoint 36, varint 1, sequence 4
const INPUT_OVERHEAD: usize = 41;
// Value 8, varint 1, P2PKH locking script 25
const P2PKH_OUTPUT_LENGTH: usize = 34;

#[derive(Debug, Clone)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub version: u32,
    pub locktime: u32,
    /// Satoshi per byte
    pub fee_rate: f64,
    /// Change below this is left to the miner
    pub dust_limit: u64,
    /// Sequence given to inputs created from unspents
    pub sequence: u32
}

impl Default for Transaction {
    fn default() -> Self {
        Self::with_settings(&Settings::default())
    }
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            version: settings.transaction_version,
            locktime: settings.transaction_locktime,
            fee_rate: settings.fee_rate,
            dust_limit: settings.dust_limit,
            sequence: settings.transaction_sequence
        }
    }

    pub fn add_input(&mut self, input: TxInput) -> &mut Self {
        self.inputs.push(input);
        self
    }

    pub fn add_inputs<I: IntoIterator<Item = TxInput>>(&mut self, inputs: I) -> &mut Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn add_unspent(&mut self, unspent: Unspent) -> &mut Self {
        let input = TxInput::new(unspent).with_sequence(self.sequence);
        self.add_input(input)
    }

    pub fn add_unspents<I: IntoIterator<Item = Unspent>>(&mut self, unspents: I) -> &mut Self {
        for unspent in unspents {
            self.add_unspent(unspent);
        }
        self
    }

    pub fn add_output(&mut self, output: TxOutput) -> &mut Self {
        self.outputs.push(output);
        self
    }

    pub fn add_outputs<I: IntoIterator<Item = TxOutput>>(&mut self, outputs: I) -> &mut Self {
        self.outputs.extend(outputs);
        self
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut raw = self.version.to_le_bytes().to_vec();
        raw.extend(encode_varint(self.inputs.len() as u64));
        for input in self.inputs.iter() {
            raw.extend(input.serialize());
        }
        raw.extend(encode_varint(self.outputs.len() as u64));
        for output in self.outputs.iter() {
            raw.extend(output.serialize());
        }
        raw.extend_from_slice(&self.locktime.to_le_bytes());
        raw
    }

    pub fn hex(&self) -> String {
        hex::encode(self.serialize())
    }

    pub fn txid(&self) -> Txid {
        Txid::from_hash(hash256(self.serialize()))
    }

    pub fn byte_length(&self) -> usize {
        self.serialize().len()
    }

    /**
        BIP143 preimage of one input:

        ```text
        version | hashPrevouts | hashSequence | outpoint | scriptCode |
        value | sequence | hashOutputs | locktime | sighash type
        ```
    */
    fn preimage(&self, input: &TxInput, hash_prevouts: &[u8; 32], hash_sequence: &[u8; 32], hash_outputs: &[u8; 32]) -> Vec<u8> {
        let mut preimage = self.version.to_le_bytes().to_vec();
        preimage.extend_from_slice(hash_prevouts);
        preimage.extend_from_slice(hash_sequence);
        preimage.extend_from_slice(&input.outpoint());
        preimage.extend(input.locking_script.byte_length_varint());
        preimage.extend_from_slice(input.locking_script.as_bytes());
        preimage.extend_from_slice(&input.satoshi.to_le_bytes());
        preimage.extend_from_slice(&input.sequence.to_le_bytes());
        preimage.extend_from_slice(hash_outputs);
        preimage.extend_from_slice(&self.locktime.to_le_bytes());
        preimage.extend_from_slice(&input.sighash.to_le_bytes());
        preimage
    }

    /**
        Preimages of every input, in input order. Signing hashes them with hash256.
    */
    pub fn digests(&self) -> Vec<Vec<u8>> {
        let zero = [0u8; 32];
        let all_prevouts = hash256(self.inputs.iter().flat_map(|i| i.outpoint()).collect::<Vec<u8>>());
        let all_sequences = hash256(self.inputs.iter().flat_map(|i| i.sequence.to_le_bytes()).collect::<Vec<u8>>());
        let all_outputs = hash256(self.outputs.iter().flat_map(|o| o.serialize()).collect::<Vec<u8>>());

        self.inputs.iter().enumerate().map(|(index, input)| {
            let sighash = input.sighash;

            let hash_prevouts = if sighash.anyone_can_pay() { zero } else { all_prevouts };

            let hash_sequence = if sighash.anyone_can_pay() || sighash.is_single() || sighash.is_none() {
                zero
            } else {
                all_sequences
            };

            let hash_outputs = if !sighash.is_single() && !sighash.is_none() {
                all_outputs
            } else if sighash.is_single() && index < self.outputs.len() {
                hash256(self.outputs[index].serialize())
            } else {
                zero
            };

            self.preimage(input, &hash_prevouts, &hash_sequence, &hash_outputs)
        }).collect()
    }

    pub fn digest(&self, index: usize) -> Result<Vec<u8>> {
        if index >= self.inputs.len() {
            return Err(Error::OutOfRange { index, len: self.inputs.len() })
        }
        Ok(self.digests().swap_remove(index))
    }

    /**
        Signs the inputs with their bound keys and builds their unlocking scripts.
        With `bypass` set, inputs that already have an unlocking script are left alone.
    */
    pub fn sign(&mut self, bypass: bool) -> Result<&mut Self> {
        let digests = self.digests();
        for (index, (input, digest)) in self.inputs.iter_mut().zip(digests.iter()).enumerate() {
            if bypass && input.is_signed() {
                trace!("input {} already signed, skipping", index);
                continue
            }
            let signatures: Vec<Vec<u8>> = input.private_keys.iter()
                .map(|key| key.sign(digest).to_der())
                .collect();
            let params = UnlockingParams {
                signatures: &signatures,
                private_keys: &input.private_keys,
                sighash: input.sighash
            };
            input.unlocking_script = Some(input.script_type.unlocking(&params)?);
            debug!("signed input {} ({:?}) with {} key(s)", index, input.script_type, signatures.len());
        }
        Ok(self)
    }

    pub fn satoshi_total_in(&self) -> u64 {
        self.inputs.iter().map(|i| i.satoshi).sum()
    }

    pub fn satoshi_total_out(&self) -> u64 {
        self.outputs.iter().map(|o| o.satoshi).sum()
    }

    /// Fee paid in the current state, negative when outputs exceed inputs
    pub fn fee(&self) -> i64 {
        self.satoshi_total_in() as i64 - self.satoshi_total_out() as i64
    }

    /**
        Size after signing. Signed inputs count their real bytes, unsigned ones
        the estimate of their script type, which needs their keys.
    */
    pub fn estimated_byte_length(&self) -> Result<usize> {
        let mut length = 4
            + encode_varint(self.inputs.len() as u64).len()
            + encode_varint(self.outputs.len() as u64).len()
            + 4;

        for (index, input) in self.inputs.iter().enumerate() {
            if input.is_signed() {
                length += input.serialize().len();
            } else {
                if input.private_keys.is_empty() {
                    return Err(Error::MissingKeys(index))
                }
                length += INPUT_OVERHEAD + input.script_type.estimated_unlocking_byte_length(&input.private_keys)?;
            }
        }
        for output in self.outputs.iter() {
            length += 8 + output.locking_script.byte_length_varint().len() + output.locking_script.byte_length();
        }
        Ok(length)
    }

    fn fee_for(&self, byte_length: usize) -> u64 {
        (self.fee_rate * byte_length as f64).ceil() as u64
    }

    pub fn estimated_fee(&self) -> Result<u64> {
        Ok(self.fee_for(self.estimated_byte_length()?))
    }

    /**
        Sends whatever exceeds the fee back as a P2PKH output, to `change_address`
        or else to the first P2PKH input's locking script. Nothing is added when
        the excess is below the dust limit.
    */
    pub fn add_change(&mut self, change_address: Option<&str>) -> Result<&mut Self> {
        let outputs = self.outputs.len() as u64;
        let size_increased = P2PKH_OUTPUT_LENGTH
            + encode_varint(outputs + 1).len()
            - encode_varint(outputs).len();
        let fee_expected = self.fee_for(self.estimated_byte_length()? + size_increased);
        let fee_overpaid = self.fee() - fee_expected as i64;

        if fee_overpaid < self.dust_limit as i64 {
            debug!("no change added, {} satoshi overpaid is below the dust limit {}", fee_overpaid, self.dust_limit);
            return Ok(self)
        }
        let change = fee_overpaid as u64;

        let output = match change_address {
            Some(address) => TxOutput::to_address(address, change)?,
            None => {
                let input = self.inputs.iter()
                    .find(|i| i.script_type == ScriptType::P2pkh)
                    .ok_or_else(|| Error::InvalidAddress("can't parse any address from transaction inputs".to_string()))?;
                TxOutput::new(input.locking_script.clone(), change, ScriptType::P2pkh)
            }
        };
        debug!("adding change output of {} satoshi", change);
        Ok(self.add_output(output))
    }

    /**
        Relays the raw transaction. With `check_fee` the inputs must cover the
        outputs plus the estimated fee.
    */
    pub fn broadcast<P: Provider + ?Sized>(&self, provider: &P, check_fee: bool) -> Result<BroadcastResult> {
        if check_fee {
            let fee_expected = self.estimated_fee()?;
            if self.fee() < fee_expected as i64 {
                let required = self.satoshi_total_out() + fee_expected;
                let available = self.satoshi_total_in();
                return Err(Error::InsufficientFunds {
                    required,
                    available: available as i64,
                    shortfall: required - available
                })
            }
        }
        debug!("broadcasting transaction {}", self.txid());
        provider.broadcast(&self.hex())
    }

    /**
        Output `vout` as an unspent of this transaction. OP_RETURN outputs give None.
    */
    pub fn to_unspent(&self, vout: u32) -> Result<Option<Unspent>> {
        let output = self.outputs.get(vout as usize)
            .ok_or(Error::OutOfRange { index: vout as usize, len: self.outputs.len() })?;
        if output.script_type == ScriptType::OpReturn {
            return Ok(None)
        }
        let unspent = Unspent::new(self.txid(), vout, output.satoshi, output.script_type, output.locking_script.clone());
        Ok(Some(unspent))
    }

    /// All outputs when `vouts` is None, skipping OP_RETURN
    pub fn to_unspents(&self, vouts: Option<&[u32]>) -> Result<Vec<Unspent>> {
        let all: Vec<u32> = (0..self.outputs.len() as u32).collect();
        let vouts = vouts.unwrap_or(&all[..]);

        let mut unspents = Vec::new();
        for vout in vouts {
            if let Some(unspent) = self.to_unspent(*vout)? {
                unspents.push(unspent);
            }
        }
        Ok(unspents)
    }

    pub fn from_hex(raw: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(raw)?)
    }

    /**
        Parses a raw transaction. Truncated input and trailing bytes are errors.
    */
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(raw);
        let mut transaction = Self::new();

        transaction.version = reader.read_u32_le()?;
        let inputs = reader.read_varint()?;
        for _ in 0..inputs {
            transaction.inputs.push(TxInput::read(&mut reader)?);
        }
        let outputs = reader.read_varint()?;
        for _ in 0..outputs {
            transaction.outputs.push(TxOutput::read(&mut reader)?);
        }
        transaction.locktime = reader.read_u32_le()?;
        reader.finish()?;
        Ok(transaction)
    }
}
