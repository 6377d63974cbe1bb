//! Upload byte decoding.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

use crate::error::{IngestError, Result};

/// Decodes upload bytes to text.
///
/// A UTF-8 BOM is stripped. UTF-16 LE/BE content (the "Unicode text" export
/// of spreadsheet tools) is recognised by its BOM and transcoded. Anything
/// else must already be valid UTF-8.
pub fn decode_content(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let Some((encoding, bom_len)) = Encoding::for_bom(bytes) else {
        return decode_utf8(bytes);
    };

    let body = &bytes[bom_len..];
    if encoding == UTF_8 {
        return decode_utf8(body);
    }

    tracing::debug!(encoding = encoding.name(), "Transcoding upload to UTF-8");
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(IngestError::UndecodableContent {
            encoding: encoding.name(),
        });
    }
    Ok(text)
}

fn decode_utf8(bytes: &[u8]) -> Result<Cow<'_, str>> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|_| IngestError::UndecodableContent {
            encoding: UTF_8.name(),
        })
}
