/*
    Cursor over raw transaction bytes.
*/

use crate::error::{Error, Result};

pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    position: usize
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(length)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| Error::Deserialize(format!(
                "need {} bytes at offset {} but only {} remain",
                length, self.position, self.data.len() - self.position
            )))?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let first = self.read_array::<1>()?[0];
        Ok(match first {
            0xfd => u16::from_le_bytes(self.read_array()?) as u64,
            0xfe => self.read_u32_le()? as u64,
            0xff => self.read_u64_le()?,
            n => n as u64
        })
    }

    /// Varint length followed by that many bytes
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8]> {
        let length = self.read_varint()?;
        let length = usize::try_from(length)
            .map_err(|_| Error::Deserialize(format!("length {} does not fit in memory", length)))?;
        self.read_bytes(length)
    }

    /// Errors if any bytes are left unread.
    pub fn finish(self) -> Result<()> {
        match self.data.len() - self.position {
            0 => Ok(()),
            n => Err(Error::Deserialize(format!("{} trailing bytes", n)))
        }
    }
}
