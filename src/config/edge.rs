// ABOUTME: Validated edge (reverse proxy + TLS) settings.
// ABOUTME: TLS can only be represented together with a domain and contact email.

use crate::types::{ContactEmail, Domain};

/// Public-facing configuration layered in front of the core services.
///
/// Built once by the resolver. A `Some(email)` in `tls` is the only way to
/// request a certificate, so "TLS without domain or email" cannot be
/// expressed past resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeConfig {
    pub domain: Domain,
    tls: Option<ContactEmail>,
}

impl EdgeConfig {
    /// HTTP-only edge configuration.
    pub fn http(domain: Domain) -> Self {
        Self { domain, tls: None }
    }

    /// Edge configuration with certificate issuance.
    pub fn https(domain: Domain, contact_email: ContactEmail) -> Self {
        Self {
            domain,
            tls: Some(contact_email),
        }
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    pub fn contact_email(&self) -> Option<&ContactEmail> {
        self.tls.as_ref()
    }

    /// Value written to `N8N_PROTOCOL`.
    pub fn protocol(&self) -> &'static str {
        if self.tls_enabled() { "https" } else { "http" }
    }

    pub fn public_url(&self) -> String {
        format!("{}://{}", self.protocol(), self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_edge_has_no_email() {
        let edge = EdgeConfig::http(Domain::parse("n8n.example.com").unwrap());
        assert!(!edge.tls_enabled());
        assert!(edge.contact_email().is_none());
        assert_eq!(edge.public_url(), "http://n8n.example.com");
    }

    #[test]
    fn https_edge_carries_email() {
        let edge = EdgeConfig::https(
            Domain::parse("n8n.example.com").unwrap(),
            ContactEmail::parse("ops@example.com").unwrap(),
        );
        assert!(edge.tls_enabled());
        assert_eq!(edge.protocol(), "https");
        assert_eq!(edge.contact_email().unwrap().as_str(), "ops@example.com");
    }
}
