use std::borrow::Cow;
use std::fmt;

/// Fixed server the network task talks to.
///
/// `hostname` is what the TLS layer verifies; `address` is what gets dialled and may be
/// an IP literal or the same hostname.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    pub hostname: Cow<'static, str>,
    pub address: Cow<'static, str>,
    pub port: u16,
}

impl Destination {
    pub fn new(
        hostname: impl Into<Cow<'static, str>>,
        address: impl Into<Cow<'static, str>>,
        port: u16,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            address: address.into(),
            port,
        }
    }

    /// `address:port`, suitable for dialling.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl Default for Destination {
    /// `os.mbed.com` on 443, dialled by name.
    fn default() -> Self {
        Self::new("os.mbed.com", "os.mbed.com", 443)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hostname == self.address {
            write!(f, "{}", self.authority())
        } else {
            write!(f, "{} via {}", self.hostname, self.authority())
        }
    }
}
