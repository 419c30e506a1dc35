//! IMU telemetry stream framing.
mod bytes;
mod scanner;

pub use scanner::*;

use serde::{Deserialize, Serialize};

/// Sentinel marking a candidate packet start.
pub const PACKET_START: u8 = 0xcc;
/// Sentinel starting an accelerometer sample inside a packet body.
pub const ACCEL_START: u8 = 0xea;
/// Sentinel starting a gyroscope sample inside a packet body.
pub const GYRO_START: u8 = 0xeb;

/// A framed packet as captured from the stream.
///
/// Holds the start sentinel, the length byte, and the `len - 2` body bytes
/// the length byte declares. Created by [`FrameScanner`] and consumed by one
/// decode call.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct RawPacket {
    /// All packet bytes, including the start sentinel and length byte.
    pub data: Vec<u8>,
}

impl RawPacket {
    /// Header length: start sentinel plus total-length byte.
    pub const HEADER_LEN: usize = 2;

    /// Total packet length declared by the length byte. The declared length
    /// counts the header bytes themselves.
    #[must_use]
    pub fn declared_len(&self) -> usize {
        self.data.get(1).map_or(0, |b| usize::from(*b))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn declared_len_reads_second_byte() {
        let packet = RawPacket {
            data: vec![PACKET_START, 0x1a, 0x00],
        };
        assert_eq!(packet.declared_len(), 26);
        assert_eq!(packet.len(), 3);
    }

    #[test]
    fn declared_len_is_zero_without_length_byte() {
        let packet = RawPacket {
            data: vec![PACKET_START],
        };
        assert_eq!(packet.declared_len(), 0);
    }
}
