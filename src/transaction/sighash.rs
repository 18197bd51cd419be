/*
    Signature hash flags.

    Every flag carries the fork id bit (0x40). The low five bits select
    the base type (ALL, NONE, SINGLE), the top bit is ANYONECANPAY.
*/

use std::fmt;

const FORKID: u8 = 0x40;
const ANYONECANPAY: u8 = 0x80;
const BASE_MASK: u8 = 0x1f;

const BASE_ALL: u8 = 0x01;
const BASE_NONE: u8 = 0x02;
const BASE_SINGLE: u8 = 0x03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigHash(u8);

impl SigHash {
    pub const ALL: SigHash = SigHash(BASE_ALL | FORKID);
    pub const NONE: SigHash = SigHash(BASE_NONE | FORKID);
    pub const SINGLE: SigHash = SigHash(BASE_SINGLE | FORKID);
    pub const ALL_ANYONECANPAY: SigHash = SigHash(BASE_ALL | FORKID | ANYONECANPAY);
    pub const NONE_ANYONECANPAY: SigHash = SigHash(BASE_NONE | FORKID | ANYONECANPAY);
    pub const SINGLE_ANYONECANPAY: SigHash = SigHash(BASE_SINGLE | FORKID | ANYONECANPAY);

    /// The fork id bit is always set on the result.
    pub fn from_u8(byte: u8) -> Self {
        SigHash(byte | FORKID)
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    /// Little endian 4 byte form written at the end of the preimage
    pub fn to_le_bytes(self) -> [u8; 4] {
        (self.0 as u32).to_le_bytes()
    }

    pub fn anyone_can_pay(self) -> bool {
        self.0 & ANYONECANPAY != 0
    }

    pub fn is_none(self) -> bool {
        self.0 & BASE_MASK == BASE_NONE
    }

    pub fn is_single(self) -> bool {
        self.0 & BASE_MASK == BASE_SINGLE
    }
}

impl Default for SigHash {
    fn default() -> Self {
        SigHash::ALL
    }
}

impl From<u8> for SigHash {
    fn from(byte: u8) -> Self {
        SigHash::from_u8(byte)
    }
}

impl fmt::Display for SigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
