use super::bytes::Bytes;
use super::{RawPacket, PACKET_START};
use crate::Result;
use std::io::{ErrorKind, Read};
use tracing::{debug, trace};

/// FrameScanner scans a byte stream for packets delimited by the start
/// sentinel and the total-length byte that follows it.
///
/// A single sentinel byte cannot delimit packets on its own since payload
/// bytes may coincidentally equal it; once a candidate start is found the
/// length byte is authoritative and the scanner never looks inside the
/// payload to resynchronize.
pub struct FrameScanner<R>
where
    R: Read + Send,
{
    bytes: Bytes<R>,
    /// Count of start sentinels found so far.
    pub frames_found: usize,
}

impl<R> FrameScanner<R>
where
    R: Read + Send,
{
    pub fn new(reader: R) -> Self {
        FrameScanner {
            bytes: Bytes::new(reader),
            frames_found: 0,
        }
    }

    /// Scan the stream until the next start sentinel, discarding everything
    /// before it, and return the zero-based stream offset of the sentinel.
    ///
    /// # Errors
    /// On end of stream this returns `Ok(None)`. Any other error results in
    /// `Err(err)`.
    pub fn scan(&mut self) -> Result<Option<usize>> {
        loop {
            let b = match self.bytes.next() {
                Err(err) => {
                    if err.kind() == ErrorKind::UnexpectedEof {
                        return Ok(None);
                    }
                    return Err(err.into());
                }
                Ok(b) => b,
            };
            if b == PACKET_START {
                let offset = self.bytes.offset() - 1;
                self.frames_found += 1;
                trace!(offset, "found start sentinel");
                return Ok(Some(offset));
            }
        }
    }

    /// Fetch the packet starting at the current stream position, i.e., the
    /// length byte and the body it declares.
    ///
    /// Returns `Ok(None)` if the stream ends mid-packet; the partial packet
    /// is dropped. A declared length shorter than the header still produces
    /// a header-only packet for the decoder to reject.
    ///
    /// # Errors
    /// Any I/O error other than end of stream.
    pub fn frame(&mut self) -> Result<Option<RawPacket>> {
        let len_byte = match self.bytes.next() {
            Err(err) => {
                if err.kind() == ErrorKind::UnexpectedEof {
                    trace!("stream ended before the length byte");
                    return Ok(None);
                }
                return Err(err.into());
            }
            Ok(b) => b,
        };
        let len = usize::from(len_byte);
        debug!(len, "framing packet");

        // The declared length counts the two header bytes already consumed.
        let mut body = vec![0u8; len.saturating_sub(RawPacket::HEADER_LEN)];
        if !self.bytes.fill(&mut body)? {
            trace!(len, "stream ended mid-packet, dropping partial frame");
            return Ok(None);
        }

        let mut data = Vec::with_capacity(RawPacket::HEADER_LEN + body.len());
        data.push(PACKET_START);
        data.push(len_byte);
        data.extend_from_slice(&body);
        Ok(Some(RawPacket { data }))
    }
}

impl<R> IntoIterator for FrameScanner<R>
where
    R: Read + Send,
{
    type Item = Result<RawPacket>;
    type IntoIter = FrameIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        FrameIter { scanner: self }
    }
}

/// Iterates over the packets framed by the source [`FrameScanner`]. Created
/// using ``FrameScanner::into_iter``.
///
/// The sequence is lazy, finite, and non-restartable; consumed bytes are
/// never re-scanned. The iterator simply ends at stream exhaustion, dropping
/// any partial packet, however, any other error is passed on.
pub struct FrameIter<R>
where
    R: Read + Send,
{
    scanner: FrameScanner<R>,
}

impl<R> Iterator for FrameIter<R>
where
    R: Read + Send,
{
    type Item = Result<RawPacket>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.scanner.scan() {
            Ok(Some(_)) => (),       // got a start sentinel
            Ok(None) => return None, // no sentinel, must be done
            Err(err) => return Some(Err(err)),
        }
        match self.scanner.frame() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Creates an iterator that produces framed packets from `reader`.
///
/// Packets are only produced when all bytes declared by their length byte
/// are available, i.e., a partial packet at the end of the stream is
/// dropped. For more control over the iteration process see
/// [`FrameScanner`].
///
/// # Errors
/// Any error reading from the stream is produced as an `Err` item.
pub fn read_frames<'a, R>(reader: R) -> impl Iterator<Item = Result<RawPacket>> + 'a
where
    R: Read + Send + 'a,
{
    FrameScanner::new(reader).into_iter()
}
