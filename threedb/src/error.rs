//! 3DB decoding error types

use thiserror::Error;

/// Error raised while decoding a 3DB file
///
/// Decoding has no recovery mode: any of these aborts the conversion of the
/// model and no partial [`Model`](crate::Model) is returned.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A read ran past the end of the buffer
    #[error(
        "unexpected end of data reading {field} at offset 0x{offset:X}: \
         needed {needed} bytes, {available} available"
    )]
    UnexpectedEof {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A seek target lies outside the buffer
    #[error("offset 0x{offset:X} is out of bounds (buffer is {len} bytes)")]
    OutOfBounds { offset: usize, len: usize },

    /// An index stored in the file points outside the table it addresses
    #[error("{field} index {index} is out of range (table has {len} entries)")]
    IndexOutOfRange {
        field: &'static str,
        index: usize,
        len: usize,
    },

    /// The input file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DecodeError {
    pub(crate) fn index_out_of_range(field: &'static str, index: usize, len: usize) -> Self {
        DecodeError::IndexOutOfRange { field, index, len }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DecodeError::UnexpectedEof {
            field: "brightness pool",
            offset: 0x1F4,
            needed: 1,
            available: 0,
        };
        assert_eq!(
            err.to_string(),
            "unexpected end of data reading brightness pool at offset 0x1F4: \
             needed 1 bytes, 0 available"
        );

        assert_eq!(
            DecodeError::index_out_of_range("vertices", 7, 2).to_string(),
            "vertices index 7 is out of range (table has 2 entries)"
        );
    }
}
