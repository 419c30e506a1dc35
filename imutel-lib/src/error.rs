#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Framed packet has no room for a timestamp.
    #[error("packet too short: {actual} bytes, minimum is {minimum}")]
    PacketTooShort { actual: usize, minimum: usize },

    /// Timestamp field could not be decoded.
    #[error("invalid timestamp field")]
    Timestamp,

    /// A 12-byte sample block could not be decoded as three floats.
    #[error("invalid sensor sample block")]
    SampleDecode,
}

pub type Result<T> = std::result::Result<T, Error>;
