use std::io::{self, ErrorKind, Read};

/// Bytes provides byte-at-a-time reads over a reader while tracking the
/// stream offset of the bytes produced so far.
pub struct Bytes<R>
where
    R: Read + Send,
{
    reader: R,
    num_read: usize,
    buf: [u8; 1],
}

impl<R> Bytes<R>
where
    R: Read + Send,
{
    pub fn new(reader: R) -> Self {
        Bytes {
            reader,
            num_read: 0,
            buf: [0u8; 1],
        }
    }

    /// Next byte from the stream, or an [`ErrorKind::UnexpectedEof`] error
    /// at end of stream.
    pub fn next(&mut self) -> Result<u8, io::Error> {
        let n = self.reader.read(&mut self.buf)?;
        if n == 0 {
            return Err(io::Error::from(ErrorKind::UnexpectedEof));
        }
        self.num_read += 1;
        Ok(self.buf[0])
    }

    /// Fill `buf` from the stream. Returns `Ok(false)` if the stream ended
    /// before `buf` could be filled.
    pub fn fill(&mut self, buf: &mut [u8]) -> Result<bool, io::Error> {
        if let Err(err) = self.reader.read_exact(buf) {
            if err.kind() == ErrorKind::UnexpectedEof {
                return Ok(false);
            }
            return Err(err);
        }
        self.num_read += buf.len();
        Ok(true)
    }

    /// Count of bytes produced so far.
    pub fn offset(&self) -> usize {
        self.num_read
    }
}
