use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Encode, borrow_decode_from_slice, config, encode_to_vec};

/// Capability contract for reconstructed application packets.
///
/// Any type deriving [`Encode`] and [`BorrowDecode`] automatically
/// implements this trait via a blanket implementation, giving framing
/// policies a uniform way to reconstruct packets from accumulated bytes
/// and callers a way to serialise them back out. The wire framing that
/// surrounds an encoded packet is the framing policy's concern, not this
/// trait's.
pub trait Packet: Encode + for<'de> BorrowDecode<'de, ()> {
    /// Serialise the packet into a byte vector.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if serialisation fails.
    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        encode_to_vec(self, config::standard())
    }

    /// Reconstruct a packet from a byte slice, returning the packet and
    /// the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the bytes do not describe a valid
    /// packet of this type.
    fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), DecodeError>
    where
        Self: Sized,
    {
        borrow_decode_from_slice(bytes, config::standard())
    }
}

impl<T> Packet for T where for<'de> T: Encode + BorrowDecode<'de, ()> {}
