//! `data:` URI helpers for images travelling through JSON.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::prelude::{Engine as _, BASE64_STANDARD};

/// Accepts payloads with or without trailing `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Standard, padded base64 of `bytes`.
pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// `data:<mime_type>;base64,<payload>` for an already encoded payload.
pub fn format(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_payload)
}

/// Strip a leading `data:image/<subtype>;base64,` header.
///
/// The subtype must consist of word characters; anything else is left as is
/// and treated as a bare payload.
pub fn strip_image_prefix(value: &str) -> &str {
    let Some(rest) = value.strip_prefix("data:image/") else {
        return value;
    };
    let Some((subtype, payload)) = rest.split_once(";base64,") else {
        return value;
    };

    let is_word = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if is_word {
        payload
    } else {
        value
    }
}

/// Decode the bytes of an image given either as a data URI or bare base64.
/// Whitespace inside the payload (line-wrapped base64) is ignored.
pub fn decode_image(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = strip_image_prefix(value.trim());
    if payload.contains(char::is_whitespace) {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        LENIENT.decode(compact)
    } else {
        LENIENT.decode(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_decodes_back_to_original_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let uri = format("image/png", &encode_base64(&bytes));

        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(decode_image(&uri).unwrap(), bytes);
    }

    #[test]
    fn strips_only_image_prefixes_with_word_subtypes() {
        assert_eq!(strip_image_prefix("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_image_prefix("data:image/x_icon;base64,QUJD"), "QUJD");
        assert_eq!(
            strip_image_prefix("data:image/svg+xml;base64,QUJD"),
            "data:image/svg+xml;base64,QUJD"
        );
        assert_eq!(
            strip_image_prefix("data:text/plain;base64,QUJD"),
            "data:text/plain;base64,QUJD"
        );
        assert_eq!(strip_image_prefix("QUJD"), "QUJD");
    }

    #[test]
    fn bare_base64_and_missing_padding_are_accepted() {
        assert_eq!(decode_image("QUJD").unwrap(), b"ABC");
        assert_eq!(decode_image("QUI").unwrap(), b"AB");
        assert_eq!(decode_image("data:image/png;base64,QU\nJD").unwrap(), b"ABC");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_image("data:image/png;base64,not base64!!").is_err());
    }
}
