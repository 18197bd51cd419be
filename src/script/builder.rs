/*

    Script builder module.

    Pushdata and integer encoding follow the minimal push rules,
    scripts are only assembled here and never executed.

*/

use crate::{
    error::{Error, Result},
    script::Script,
    util::unsigned_to_bytes
};

#[derive(Debug, Clone, Default)]
pub struct Builder {
    code: Vec<u8>
}

impl Builder {
    /// Return a new instance of self
    pub fn new() -> Self  {
        Self { code: Vec::new() }
    }

    /// Push an opcode into self
    pub fn push_opcode(mut self, opcode: Opcode) -> Self {
        self.code.push(opcode.into_u8());
        self
    }

    //Push a slice into the code as is
    pub fn push_slice(mut self, slice: &[u8]) -> Self {
        self.code.extend_from_slice(slice);
        self
    }

    /// Push data with the minimal push opcode for it
    pub fn push_data(mut self, data: &[u8]) -> Result<Self> {
        self.code.extend(encode_pushdata(data, true)?);
        Ok(self)
    }

    /// Push a script number
    pub fn push_int(mut self, n: i64) -> Self {
        self.code.extend(encode_int(n));
        self
    }

    /// Convert self into a script
    pub fn into_script(self) -> Script {
        Script::new(self.code)
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode {
    code: u8
}

impl Opcode {
    pub fn into_u8(self) -> u8 {
        self.code
    }

    /// OP_1 .. OP_16 for n in 1..=16
    pub fn push_num(n: u8) -> Option<Opcode> {
        match n {
            1..=16 => Some(Opcode { code: opcodes::OP_1.code + n - 1 }),
            _ => None
        }
    }
}

impl From<u8> for Opcode {
    fn from(code: u8) -> Self {
        Self { code }
    }
}

// Opcode constants
pub mod opcodes {
    use super::Opcode;

    /// Push an empty array onto the stack
    pub const OP_0: Opcode = Opcode {code: 0x00};
    pub const OP_FALSE: Opcode = OP_0;
    /// Next byte is the number of bytes to push
    pub const OP_PUSHDATA1: Opcode = Opcode {code: 0x4c};
    /// Next 2 bytes (little endian) are the number of bytes to push
    pub const OP_PUSHDATA2: Opcode = Opcode {code: 0x4d};
    /// Next 4 bytes (little endian) are the number of bytes to push
    pub const OP_PUSHDATA4: Opcode = Opcode {code: 0x4e};
    /// Push -1
    pub const OP_1NEGATE: Opcode = Opcode {code: 0x4f};
    pub const OP_1: Opcode = Opcode {code: 0x51};
    pub const OP_TRUE: Opcode = OP_1;
    pub const OP_2: Opcode = Opcode {code: 0x52};
    pub const OP_3: Opcode = Opcode {code: 0x53};
    pub const OP_16: Opcode = Opcode {code: 0x60};

    // Flow control
    pub const OP_NOP: Opcode = Opcode {code: 0x61};
    pub const OP_IF: Opcode = Opcode {code: 0x63};
    pub const OP_NOTIF: Opcode = Opcode {code: 0x64};
    pub const OP_ELSE: Opcode = Opcode {code: 0x67};
    pub const OP_ENDIF: Opcode = Opcode {code: 0x68};
    pub const OP_VERIFY: Opcode = Opcode {code: 0x69};
    /// Marks the output as provably unspendable
    pub const OP_RETURN: Opcode = Opcode {code: 0x6a};

    // Stack
    pub const OP_TOALTSTACK: Opcode = Opcode {code: 0x6b};
    pub const OP_FROMALTSTACK: Opcode = Opcode {code: 0x6c};
    pub const OP_DROP: Opcode = Opcode {code: 0x75};
    /// Duplicate the top stack item
    pub const OP_DUP: Opcode = Opcode {code: 0x76};
    pub const OP_SWAP: Opcode = Opcode {code: 0x7c};

    // Splice
    pub const OP_CAT: Opcode = Opcode {code: 0x7e};
    pub const OP_SPLIT: Opcode = Opcode {code: 0x7f};
    pub const OP_SIZE: Opcode = Opcode {code: 0x82};

    // Bitwise logic
    pub const OP_EQUAL: Opcode = Opcode {code: 0x87};
    pub const OP_EQUALVERIFY: Opcode = Opcode {code: 0x88};

    // Arithmetic
    pub const OP_ADD: Opcode = Opcode {code: 0x93};
    pub const OP_SUB: Opcode = Opcode {code: 0x94};
    pub const OP_NUMEQUAL: Opcode = Opcode {code: 0x9c};

    // Crypto
    pub const OP_RIPEMD160: Opcode = Opcode {code: 0xa6};
    pub const OP_SHA256: Opcode = Opcode {code: 0xa8};
    /// ripemd160(sha256(top stack item))
    pub const OP_HASH160: Opcode = Opcode {code: 0xa9};
    pub const OP_HASH256: Opcode = Opcode {code: 0xaa};
    pub const OP_CHECKSIG: Opcode = Opcode {code: 0xac};
    pub const OP_CHECKSIGVERIFY: Opcode = Opcode {code: 0xad};
    pub const OP_CHECKMULTISIG: Opcode = Opcode {code: 0xae};
    pub const OP_CHECKMULTISIGVERIFY: Opcode = Opcode {code: 0xaf};

    // Locktime
    pub const OP_CHECKLOCKTIMEVERIFY: Opcode = Opcode {code: 0xb1};
    pub const OP_CHECKSEQUENCEVERIFY: Opcode = Opcode {code: 0xb2};
}

/**
    Opcode and length prefix that introduce a push of `length` bytes.
*/
pub fn get_pushdata_code(length: usize) -> Result<Vec<u8>> {
    let length = length as u64;
    let code = if length <= 0x4b {
        vec![length as u8]
    } else if length <= 0xff {
        vec![opcodes::OP_PUSHDATA1.into_u8(), length as u8]
    } else if length <= 0xffff {
        let mut v = vec![opcodes::OP_PUSHDATA2.into_u8()];
        v.extend_from_slice(&(length as u16).to_le_bytes());
        v
    } else if length <= 0xffff_ffff {
        let mut v = vec![opcodes::OP_PUSHDATA4.into_u8()];
        v.extend_from_slice(&(length as u32).to_le_bytes());
        v
    } else {
        return Err(Error::InvalidScript("data too long to encode in a PUSHDATA opcode".to_string()))
    };
    Ok(code)
}

/**
    Encodes a push of data.
    With minimal push an empty push is OP_0, a single byte 1..=16 is OP_1..OP_16
    and 0x81 is OP_1NEGATE. Without it empty data is rejected.
*/
pub fn encode_pushdata(data: &[u8], minimal: bool) -> Result<Vec<u8>> {
    if minimal {
        match data {
            [] => return Ok(vec![opcodes::OP_0.into_u8()]),
            [n @ 1..=16] => return Ok(vec![opcodes::OP_1.into_u8() + n - 1]),
            [0x81] => return Ok(vec![opcodes::OP_1NEGATE.into_u8()]),
            _ => {}
        }
    } else if data.is_empty() {
        return Err(Error::InvalidScript("empty pushdata".to_string()))
    }

    let mut out = get_pushdata_code(data.len())?;
    out.extend_from_slice(data);
    Ok(out)
}

/**
    Encodes a script number: little endian sign-magnitude with the sign in the
    top bit of the last byte, then pushed minimally.
*/
pub fn encode_int(n: i64) -> Vec<u8> {
    if n == 0 {
        return vec![opcodes::OP_0.into_u8()]
    }

    let mut magnitude = unsigned_to_bytes(n.unsigned_abs());
    magnitude.reverse();
    if magnitude.last().map_or(false, |b| b & 0x80 != 0) {
        magnitude.push(0x00);
    }
    if n < 0 {
        if let Some(last) = magnitude.last_mut() {
            *last |= 0x80;
        }
    }

    let mut out = match magnitude.as_slice() {
        [n @ 1..=16] => return vec![opcodes::OP_1.into_u8() + n - 1],
        [0x81] => return vec![opcodes::OP_1NEGATE.into_u8()],
        _ => vec![magnitude.len() as u8]
    };
    out.extend(magnitude);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushdata_codes() {
        assert_eq!(get_pushdata_code(0x4b).unwrap(), vec![0x4b]);
        assert_eq!(get_pushdata_code(0x4c).unwrap(), vec![0x4c, 0x4c]);
        assert_eq!(get_pushdata_code(0xff).unwrap(), vec![0x4c, 0xff]);
        assert_eq!(get_pushdata_code(0x0100).unwrap(), vec![0x4d, 0x00, 0x01]);
        assert_eq!(get_pushdata_code(0xffff).unwrap(), vec![0x4d, 0xff, 0xff]);
        assert_eq!(get_pushdata_code(0x010000).unwrap(), vec![0x4e, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(get_pushdata_code(0x01020304).unwrap(), vec![0x4e, 0x04, 0x03, 0x02, 0x01]);
        assert!(get_pushdata_code(0x01_0000_0000).is_err());
    }

    #[test]
    fn minimal_pushdata() {
        assert_eq!(encode_pushdata(b"", true).unwrap(), vec![0x00]);
        assert_eq!(encode_pushdata(&[0x00], true).unwrap(), vec![0x01, 0x00]);
        assert_eq!(encode_pushdata(&[0x01], true).unwrap(), vec![0x51]);
        assert_eq!(encode_pushdata(&[0x02], true).unwrap(), vec![0x52]);
        assert_eq!(encode_pushdata(&[0x10], true).unwrap(), vec![0x60]);
        assert_eq!(encode_pushdata(&[0x11], true).unwrap(), vec![0x01, 0x11]);
        assert_eq!(encode_pushdata(&[0x81], true).unwrap(), vec![0x4f]);
    }

    #[test]
    fn non_minimal_pushdata() {
        assert!(encode_pushdata(b"", false).is_err());
        for byte in [0x00u8, 0x01, 0x02, 0x10, 0x11, 0x81].iter() {
            assert_eq!(encode_pushdata(&[*byte], false).unwrap(), vec![0x01, *byte]);
        }
    }

    #[test]
    fn script_numbers() {
        let cases: [(i64, &str); 26] = [
            (-2147483648, "050000008080"),
            (-2147483647, "04ffffffff"),
            (-8388608, "0400008080"),
            (-8388607, "03ffffff"),
            (-32768, "03008080"),
            (-32767, "02ffff"),
            (-128, "028080"),
            (-127, "01ff"),
            (-17, "0191"),
            (-16, "0190"),
            (-2, "0182"),
            (-1, "4f"),
            (0, "00"),
            (1, "51"),
            (2, "52"),
            (16, "60"),
            (17, "0111"),
            (127, "017f"),
            (128, "028000"),
            (32767, "02ff7f"),
            (32768, "03008000"),
            (8388607, "03ffff7f"),
            (8388608, "0400008000"),
            (2147483647, "04ffffff7f"),
            (2147483648, "050000008000"),
            (i64::MIN + 1, "08ffffffffffffffff")
        ];
        for (n, expected) in cases.iter() {
            assert_eq!(hex::encode(encode_int(*n)), *expected, "encoding {}", n);
        }
    }

    #[test]
    fn builder() {
        let script = Builder::new()
            .push_opcode(opcodes::OP_DUP)
            .push_int(3)
            .push_data(b"ab").unwrap()
            .push_slice(&[0xff])
            .into_script();
        assert_eq!(script.hex(), "7653026162ff");
        assert_eq!(Opcode::push_num(16), Some(opcodes::OP_16));
        assert_eq!(Opcode::push_num(0), None);
    }
}
