//! IMU packet decoding.
use std::fmt::Display;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::framing::{read_frames, RawPacket, ACCEL_START, GYRO_START, PACKET_START};
use crate::{Error, Result};

/// A single 3-axis sensor reading.
///
/// Decoded from exactly [`Self::LEN`] bytes, three consecutive little-endian
/// IEEE-754 32-bit floats.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SensorTriplet {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SensorTriplet {
    /// Size of an encoded triplet.
    pub const LEN: usize = 12;

    /// Decode from bytes. Returns `None` if there are not enough bytes.
    #[must_use]
    pub fn decode(dat: &[u8]) -> Option<Self> {
        if dat.len() < Self::LEN {
            return None;
        }
        Some(SensorTriplet {
            x: f32::from_le_bytes([dat[0], dat[1], dat[2], dat[3]]),
            y: f32::from_le_bytes([dat[4], dat[5], dat[6], dat[7]]),
            z: f32::from_le_bytes([dat[8], dat[9], dat[10], dat[11]]),
        })
    }

    /// Encode to the 12-byte wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[..4].copy_from_slice(&self.x.to_le_bytes());
        buf[4..8].copy_from_slice(&self.y.to_le_bytes());
        buf[8..].copy_from_slice(&self.z.to_le_bytes());
        buf
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SampleKind {
    Accel,
    Gyro,
}

/// Decoder sub-state while walking a packet body.
#[derive(Debug)]
enum SampleState {
    /// Between samples. Sentinel bytes start a sample, anything else is
    /// skipped.
    Idle,
    /// Accumulating the 12 bytes of one sample.
    Reading {
        kind: SampleKind,
        buf: [u8; SensorTriplet::LEN],
        count: usize,
    },
}

impl SampleState {
    fn reading(kind: SampleKind) -> Self {
        SampleState::Reading {
            kind,
            buf: [0u8; SensorTriplet::LEN],
            count: 0,
        }
    }
}

/// A fully decoded IMU packet.
///
/// Sample order matches appearance order in the packet body; either sequence
/// may be empty or contain more than one sample.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DecodedPacket {
    /// Unsigned big-endian timestamp from bytes 2..6.
    pub timestamp: u32,
    pub accel: Vec<SensorTriplet>,
    pub gyro: Vec<SensorTriplet>,
}

impl Display for DecodedPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DecodedPacket{{timestamp: {}, accel:[len={}], gyro:[len={}]}}",
            self.timestamp,
            self.accel.len(),
            self.gyro.len()
        )?;
        Ok(())
    }
}

impl DecodedPacket {
    /// Offset of the timestamp field.
    pub const TIMESTAMP_OFFSET: usize = 2;
    /// Minimum total packet length able to hold the header and a timestamp.
    pub const MIN_LEN: usize = 7;

    /// Decode one framed packet.
    ///
    /// The body is walked byte-by-byte: a sentinel starts a sample, the 12
    /// bytes after it are the sample payload, and unrecognized bytes between
    /// samples are skipped. A sample cut off by the end of the packet is
    /// dropped without error.
    ///
    /// # Errors
    /// [`Error::PacketTooShort`] if the packet cannot hold a timestamp, or
    /// [`Error::SampleDecode`] if a sample payload cannot be decoded. A
    /// failed decode surfaces no partial results.
    pub fn decode(raw: &RawPacket) -> Result<DecodedPacket> {
        if raw.len() < Self::MIN_LEN {
            return Err(Error::PacketTooShort {
                actual: raw.len(),
                minimum: Self::MIN_LEN,
            });
        }

        let timestamp = u32::from_be_bytes([raw.data[2], raw.data[3], raw.data[4], raw.data[5]]);

        let mut accel: Vec<SensorTriplet> = Vec::new();
        let mut gyro: Vec<SensorTriplet> = Vec::new();
        let mut state = SampleState::Idle;

        for &b in &raw.data[Self::TIMESTAMP_OFFSET + 4..] {
            state = match state {
                SampleState::Reading {
                    kind,
                    mut buf,
                    count,
                } => {
                    buf[count] = b;
                    let count = count + 1;
                    if count == SensorTriplet::LEN {
                        // The byte completing a sample is never also a sentinel
                        let sample = SensorTriplet::decode(&buf).ok_or(Error::SampleDecode)?;
                        match kind {
                            SampleKind::Accel => accel.push(sample),
                            SampleKind::Gyro => gyro.push(sample),
                        }
                        SampleState::Idle
                    } else {
                        SampleState::Reading { kind, buf, count }
                    }
                }
                SampleState::Idle => match b {
                    ACCEL_START => SampleState::reading(SampleKind::Accel),
                    GYRO_START => SampleState::reading(SampleKind::Gyro),
                    _ => SampleState::Idle,
                },
            };
        }

        if let SampleState::Reading { kind, count, .. } = state {
            debug!(?kind, count, "dropping sample cut off by end of packet");
        }

        Ok(DecodedPacket {
            timestamp,
            accel,
            gyro,
        })
    }

    /// Encode to the wire form: start sentinel, total length, big-endian
    /// timestamp, then accelerometer samples followed by gyroscope samples,
    /// each preceded by its sentinel.
    ///
    /// Returns `None` if the encoded packet would not fit the one-byte
    /// length field.
    #[must_use]
    pub fn encode(&self) -> Option<Vec<u8>> {
        let body_len = (self.accel.len() + self.gyro.len()) * (SensorTriplet::LEN + 1);
        let total = RawPacket::HEADER_LEN + 4 + body_len;
        let len = u8::try_from(total).ok()?;

        let mut data = Vec::with_capacity(total);
        data.push(PACKET_START);
        data.push(len);
        data.extend_from_slice(&self.timestamp.to_be_bytes());
        for sample in &self.accel {
            data.push(ACCEL_START);
            data.extend_from_slice(&sample.encode());
        }
        for sample in &self.gyro {
            data.push(GYRO_START);
            data.extend_from_slice(&sample.encode());
        }
        Some(data)
    }
}

/// Iterator over decoded packets; created by [`read_packets`].
pub struct PacketIter<I>
where
    I: Iterator<Item = Result<RawPacket>>,
{
    frames: I,
}

impl<I> Iterator for PacketIter<I>
where
    I: Iterator<Item = Result<RawPacket>>,
{
    type Item = Result<DecodedPacket>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = match self.frames.next()? {
            Ok(raw) => raw,
            Err(err) => return Some(Err(err)),
        };
        match DecodedPacket::decode(&raw) {
            Ok(packet) => {
                debug!(timestamp = packet.timestamp, "decoded packet");
                Some(Ok(packet))
            }
            Err(err) => {
                warn!(len = raw.len(), "dropping packet: {err}");
                Some(Err(err))
            }
        }
    }
}

/// Return an iterator providing [`DecodedPacket`]s framed and decoded from
/// `reader`.
///
/// Decode failures are local to one packet: they are produced as `Err` items
/// and iteration continues with the next frame. Only stream-level I/O errors
/// are worth aborting for.
///
/// # Examples
/// ```
/// use imutel::packet::read_packets;
///
/// let dat: &[u8] = &[0xcc, 0x07, 0x00, 0x00, 0x00, 0x01, 0xea];
///
/// for zult in read_packets(dat) {
///     let packet = zult.unwrap();
///     assert_eq!(packet.timestamp, 1);
/// }
/// ```
pub fn read_packets<'a, R>(reader: R) -> impl Iterator<Item = Result<DecodedPacket>> + 'a
where
    R: Read + Send + 'a,
{
    PacketIter {
        frames: read_frames(reader),
    }
}
