use crate::ValueError;

/// 32-byte BLAKE2b-256 output. Computing one requires the canonical LC-B
/// encoding (see `hlx_codec_b::digest`); this type only carries the bytes
/// and their hex `Display`/`FromStr` forms, so `hlx_value` itself never
/// depends on a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, ValueError> {
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValueError::InvalidDigest(s.to_string()));
        }
        let bytes = hex::decode(s).map_err(|_| ValueError::InvalidDigest(s.to_string()))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Digest(out))
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Digest {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::from_hex(s)
    }
}

/// The generic handle tag used by the interpreters: `&h_`.
pub const TAG_GENERIC: &str = "&h_";
/// The tag used for stored shader objects: `&h_shader_`.
pub const TAG_SHADER: &str = "&h_shader_";

/// A parsed handle string: `<tag>_<64-hex-digest>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    tag: String,
    digest: Digest,
}

impl Handle {
    /// Constructs a handle string `tag + hex(digest)`. `tag`
    /// must already carry its trailing separator, e.g. `"&h_"` or
    /// `"&h_shader_"`.
    pub fn new(tag: impl Into<String>, digest: Digest) -> Self {
        Handle { tag: tag.into(), digest }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// First two hex characters of the digest — the fan-out directory for
    /// the CAS object layer.
    pub fn fanout_prefix(&self) -> String {
        self.digest.to_hex()[..2].to_string()
    }

    /// Remaining 62 hex characters — the object filename.
    pub fn fanout_suffix(&self) -> String {
        self.digest.to_hex()[2..].to_string()
    }

    /// Parses a handle string, trying the known tags longest-first so
    /// `&h_shader_...` is not mistaken for the generic `&h_...` form.
    pub fn parse(s: &str) -> Result<Self, ValueError> {
        for tag in [TAG_SHADER, TAG_GENERIC] {
            if let Some(hex_part) = s.strip_prefix(tag) {
                if let Ok(digest) = Digest::from_hex(hex_part) {
                    return Ok(Handle { tag: tag.to_string(), digest });
                }
            }
        }
        Err(ValueError::InvalidHandle(s.to_string()))
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.tag, self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_generic_handle() {
        let digest = Digest([7u8; 32]);
        let handle = Handle::new(TAG_GENERIC, digest);
        let s = handle.to_string();
        assert_eq!(s, format!("&h_{}", digest));
        let parsed = Handle::parse(&s).unwrap();
        assert_eq!(parsed, handle);
    }

    #[test]
    fn roundtrip_shader_handle() {
        let digest = Digest([9u8; 32]);
        let handle = Handle::new(TAG_SHADER, digest);
        let s = handle.to_string();
        let parsed = Handle::parse(&s).unwrap();
        assert_eq!(parsed.tag(), TAG_SHADER);
        assert_eq!(parsed.digest(), digest);
    }

    #[test]
    fn rejects_malformed_digest() {
        assert!(Handle::parse("&h_not-hex").is_err());
        assert!(Handle::parse("&h_deadbeef").is_err());
    }
}
