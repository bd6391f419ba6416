//! Byte-level helpers shared by the account decoders and instruction encoders.

use solana_pubkey::Pubkey;

use crate::error::{SdkError, SdkResult};

// ============================================================================
// ByteReader
// ============================================================================

/// Little-endian cursor over borsh-encoded account data.
///
/// Every read checks bounds and fails with [`SdkError::InvalidDataLength`].
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Start reading at `offset`.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    pub fn read_bytes<const N: usize>(&mut self) -> SdkResult<[u8; N]> {
        let slice = self.read_slice(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(slice);
        Ok(arr)
    }

    pub fn read_slice(&mut self, len: usize) -> SdkResult<&'a [u8]> {
        let end = self.offset + len;
        if end > self.data.len() {
            return Err(SdkError::InvalidDataLength {
                expected: end,
                actual: self.data.len(),
            });
        }
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> SdkResult<()> {
        self.read_slice(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> SdkResult<u8> {
        Ok(self.read_bytes::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> SdkResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> SdkResult<u16> {
        Ok(u16::from_le_bytes(self.read_bytes()?))
    }

    pub fn read_u32(&mut self) -> SdkResult<u32> {
        Ok(u32::from_le_bytes(self.read_bytes()?))
    }

    pub fn read_u64(&mut self) -> SdkResult<u64> {
        Ok(u64::from_le_bytes(self.read_bytes()?))
    }

    pub fn read_i64(&mut self) -> SdkResult<i64> {
        Ok(i64::from_le_bytes(self.read_bytes()?))
    }

    pub fn read_pubkey(&mut self) -> SdkResult<Pubkey> {
        Ok(Pubkey::new_from_array(self.read_bytes::<32>()?))
    }

    /// Borsh `Option<T>`: one tag byte, then the value when the tag is 1.
    pub fn read_option<T>(&mut self, read: impl FnOnce(&mut Self) -> SdkResult<T>) -> SdkResult<Option<T>> {
        match self.read_u8()? {
            0 => Ok(None),
            _ => read(self).map(Some),
        }
    }

    /// SPL `COption<T>`: a four byte tag, then the value (always present).
    pub fn read_coption_pubkey(&mut self) -> SdkResult<Option<Pubkey>> {
        let tag = self.read_u32()?;
        let value = self.read_pubkey()?;
        Ok((tag == 1).then_some(value))
    }

    /// Borsh string with a u32 length prefix.
    pub fn read_string(&mut self) -> SdkResult<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_slice(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| SdkError::Serialization(e.to_string()))
    }

    /// Borsh `Vec<T>` with a u32 length prefix.
    pub fn read_vec<T>(&mut self, mut read: impl FnMut(&mut Self) -> SdkResult<T>) -> SdkResult<Vec<T>> {
        let len = self.read_u32()? as usize;
        (0..len).map(|_| read(self)).collect()
    }
}

/// Check an 8 byte discriminator, reporting both values as hex.
pub fn check_discriminator(data: &[u8], expected: &[u8; 8]) -> SdkResult<()> {
    if data.len() < 8 {
        return Err(SdkError::InvalidDataLength {
            expected: 8,
            actual: data.len(),
        });
    }
    if &data[..8] != expected {
        return Err(SdkError::InvalidDiscriminator {
            expected: hex::encode(expected),
            actual: hex::encode(&data[..8]),
        });
    }
    Ok(())
}

// ============================================================================
// Strings
// ============================================================================

/// Strip the NUL padding Token Metadata stores in fixed-size strings.
pub fn remove_empty_chars(value: &str) -> String {
    value.trim_end_matches('\0').to_string()
}

/// Right-pad `value` with NULs up to `len` bytes.
pub fn pad_empty_chars(value: &str, len: usize) -> SdkResult<Vec<u8>> {
    let bytes = value.as_bytes();
    if bytes.len() > len {
        return Err(SdkError::Validation(format!(
            "\"{}\" exceeds the maximum of {} bytes",
            value, len
        )));
    }
    let mut padded = bytes.to_vec();
    padded.resize(len, 0);
    Ok(padded)
}

/// Encode a borsh string with a u32 length prefix.
pub fn serialize_string(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(4 + bytes.len());
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_primitives() {
        let mut data = vec![1u8];
        data.extend_from_slice(&513u16.to_le_bytes());
        data.extend_from_slice(&42u64.to_le_bytes());
        data.extend_from_slice(&serialize_string("abc"));

        let mut reader = ByteReader::new(&data);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_u16().unwrap(), 513);
        assert_eq!(reader.read_u64().unwrap(), 42);
        assert_eq!(reader.read_string().unwrap(), "abc");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_reader_out_of_bounds() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        assert!(matches!(
            reader.read_u64(),
            Err(SdkError::InvalidDataLength { expected: 8, actual: 3 })
        ));
    }

    #[test]
    fn test_option_and_vec() {
        let key = Pubkey::new_unique();
        let mut data = vec![0u8, 1u8];
        data.extend_from_slice(key.as_ref());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&[7, 8]);

        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_option(|r| r.read_pubkey()).unwrap(), None);
        assert_eq!(reader.read_option(|r| r.read_pubkey()).unwrap(), Some(key));
        assert_eq!(reader.read_vec(|r| r.read_u8()).unwrap(), vec![7, 8]);
    }

    #[test]
    fn test_discriminator_mismatch_is_hex() {
        let err = check_discriminator(&[0u8; 8], &[1u8; 8]).unwrap_err();
        match err {
            SdkError::InvalidDiscriminator { expected, actual } => {
                assert_eq!(expected, "0101010101010101");
                assert_eq!(actual, "0000000000000000");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_chars() {
        assert_eq!(remove_empty_chars("Name\0\0\0"), "Name");
        assert_eq!(pad_empty_chars("VIP", 6).unwrap(), b"VIP\0\0\0".to_vec());
        assert!(pad_empty_chars("TOO-LONG", 6).is_err());
    }
}
