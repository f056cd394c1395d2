//! WSAPI protocol version selection.

/// The web service protocol version a client targets.
///
/// The legacy 1.x protocol has no CSRF handshake; v2.0 requires a security
/// token on every mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WsapiVersion {
    /// Legacy 1.x protocol (final 1.x release).
    V1_43,
    /// Current 2.0 protocol.
    #[default]
    V2_0,
}

impl WsapiVersion {
    /// The version segment as it appears in request paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            WsapiVersion::V1_43 => "1.43",
            WsapiVersion::V2_0 => "v2.0",
        }
    }

    /// Returns true when mutating calls must carry a security token.
    pub fn requires_security_token(&self) -> bool {
        matches!(self, WsapiVersion::V2_0)
    }
}

impl std::fmt::Display for WsapiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
