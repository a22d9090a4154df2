use std::{fmt, net::IpAddr};

use crate::daemon::types::{AccessMethodKind, AccessMethodSetting, CustomProxy, NewAccessMethod, SocksAuthentication};

pub const SHADOWSOCKS_CIPHERS: &[&str] = &[
    "aes-128-cfb",
    "aes-128-cfb1",
    "aes-128-cfb128",
    "aes-128-cfb8",
    "aes-128-gcm",
    "aes-128-pmac-siv",
    "aes-256-cfb",
    "aes-256-cfb1",
    "aes-256-cfb128",
    "aes-256-cfb8",
    "aes-256-gcm",
    "aes-256-pmac-siv",
    "chacha20",
    "chacha20-ietf",
    "chacha20-ietf-poly1305",
    "rc4",
    "rc4-md5",
    "salsa20",
    "xchacha20-ietf-poly1305",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProxyKind {
    #[default]
    Shadowsocks,
    Socks5Remote,
}

impl ProxyKind {
    pub const ALL: [ProxyKind; 2] = [Self::Shadowsocks, Self::Socks5Remote];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Shadowsocks => "Shadowsocks",
            Self::Socks5Remote => "SOCKS5 remote",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyFormError {
    NameRequired,
    InvalidServer,
    InvalidPort,
    CipherRequired,
    AuthenticationIncomplete,
}

impl fmt::Display for ProxyFormError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::NameRequired => "Please enter a name.",
            Self::InvalidServer => "Please enter a valid IPv4 or IPv6 address.",
            Self::InvalidPort => "Please enter a valid remote server port.",
            Self::CipherRequired => "Please select a cipher.",
            Self::AuthenticationIncomplete => "Username and password are required.",
        })
    }
}

impl std::error::Error for ProxyFormError {}

pub fn parse_port(text: &str) -> Option<u16> {
    text.trim().parse::<u16>().ok().filter(|port| *port > 0)
}

pub fn is_valid_server(text: &str) -> bool {
    text.trim().parse::<IpAddr>().is_ok()
}

/// Editable fields of a custom API access method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyForm {
    pub name: String,
    pub kind: ProxyKind,
    pub server: String,
    pub port: String,
    pub password: String,
    pub cipher: Option<String>,
    pub authentication: bool,
    pub username: String,
    /// Set when editing an existing method.
    pub editing: Option<AccessMethodSetting>,
}

impl ProxyForm {
    /// Prefills the form from a custom method. Built-in methods cannot be edited.
    pub fn edit(method: &AccessMethodSetting) -> Option<Self> {
        let AccessMethodKind::Custom(proxy) = &method.kind else {
            return None;
        };
        let mut form = Self {
            name: method.name.clone(),
            editing: Some(method.clone()),
            ..Default::default()
        };
        match proxy {
            CustomProxy::Shadowsocks {
                ip,
                port,
                password,
                cipher,
            } => {
                form.kind = ProxyKind::Shadowsocks;
                form.server = ip.clone();
                form.port = port.to_string();
                form.password = password.clone();
                form.cipher = Some(cipher.clone());
            }
            CustomProxy::Socks5Remote {
                ip,
                port,
                authentication,
            } => {
                form.kind = ProxyKind::Socks5Remote;
                form.server = ip.clone();
                form.port = port.to_string();
                if let Some(authentication) = authentication {
                    form.authentication = true;
                    form.username = authentication.username.clone();
                    form.password = authentication.password.clone();
                }
            }
        }
        Some(form)
    }

    pub fn is_new(&self) -> bool {
        self.editing.is_none()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_new() { "Add" } else { "Save" }
    }

    pub fn set_cipher(&mut self, cipher: &str) {
        if SHADOWSOCKS_CIPHERS.contains(&cipher) {
            self.cipher = Some(cipher.to_string());
        }
    }

    /// Inline error for the server row; empty input shows nothing.
    pub fn server_error(&self) -> Option<ProxyFormError> {
        (!self.server.is_empty() && !is_valid_server(&self.server))
            .then_some(ProxyFormError::InvalidServer)
    }

    pub fn port_error(&self) -> Option<ProxyFormError> {
        (!self.port.is_empty() && parse_port(&self.port).is_none())
            .then_some(ProxyFormError::InvalidPort)
    }

    pub fn proxy(&self) -> Result<CustomProxy, ProxyFormError> {
        if !is_valid_server(&self.server) {
            return Err(ProxyFormError::InvalidServer);
        }
        let port = parse_port(&self.port).ok_or(ProxyFormError::InvalidPort)?;
        let ip = self.server.trim().to_string();
        match self.kind {
            ProxyKind::Shadowsocks => {
                let cipher = self.cipher.clone().ok_or(ProxyFormError::CipherRequired)?;
                Ok(CustomProxy::Shadowsocks {
                    ip,
                    port,
                    password: self.password.clone(),
                    cipher,
                })
            }
            ProxyKind::Socks5Remote => {
                let authentication = if self.authentication {
                    if self.username.is_empty() || self.password.is_empty() {
                        return Err(ProxyFormError::AuthenticationIncomplete);
                    }
                    Some(SocksAuthentication {
                        username: self.username.clone(),
                        password: self.password.clone(),
                    })
                } else {
                    None
                };
                Ok(CustomProxy::Socks5Remote {
                    ip,
                    port,
                    authentication,
                })
            }
        }
    }

    fn validated_name(&self) -> Result<String, ProxyFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProxyFormError::NameRequired);
        }
        Ok(name.to_string())
    }

    pub fn is_submittable(&self) -> bool {
        self.validated_name().is_ok() && self.proxy().is_ok()
    }

    pub fn new_access_method(&self) -> Result<NewAccessMethod, ProxyFormError> {
        Ok(NewAccessMethod {
            name: self.validated_name()?,
            enabled: true,
            proxy: self.proxy()?,
        })
    }

    /// The edited method with the form's values, keeping id and enabled state.
    pub fn updated_method(&self) -> Option<Result<AccessMethodSetting, ProxyFormError>> {
        let existing = self.editing.as_ref()?;
        Some(self.validated_name().and_then(|name| {
            Ok(AccessMethodSetting {
                id: existing.id.clone(),
                name,
                enabled: existing.enabled,
                kind: AccessMethodKind::Custom(self.proxy()?),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shadowsocks_form() -> ProxyForm {
        ProxyForm {
            name: "Office".into(),
            server: "192.0.2.10".into(),
            port: "443".into(),
            password: "secret".into(),
            cipher: Some("aes-256-gcm".into()),
            ..Default::default()
        }
    }

    #[test]
    fn shadowsocks_method_is_built() {
        assert_eq!(
            shadowsocks_form().new_access_method(),
            Ok(NewAccessMethod {
                name: "Office".into(),
                enabled: true,
                proxy: CustomProxy::Shadowsocks {
                    ip: "192.0.2.10".into(),
                    port: 443,
                    password: "secret".into(),
                    cipher: "aes-256-gcm".into(),
                },
            })
        );
    }

    #[test]
    fn fields_are_validated() {
        let mut form = shadowsocks_form();
        form.name = "  ".into();
        assert_eq!(form.new_access_method(), Err(ProxyFormError::NameRequired));

        let mut form = shadowsocks_form();
        form.server = "proxy.example.com".into();
        assert_eq!(form.server_error(), Some(ProxyFormError::InvalidServer));
        assert!(!form.is_submittable());

        let mut form = shadowsocks_form();
        form.port = "0".into();
        assert_eq!(form.port_error(), Some(ProxyFormError::InvalidPort));
        form.port = "65536".into();
        assert_eq!(form.proxy(), Err(ProxyFormError::InvalidPort));

        let mut form = shadowsocks_form();
        form.cipher = None;
        form.set_cipher("rot13");
        assert_eq!(form.proxy(), Err(ProxyFormError::CipherRequired));
    }

    #[test]
    fn socks_authentication_needs_both_fields() {
        let mut form = ProxyForm {
            name: "Socks".into(),
            kind: ProxyKind::Socks5Remote,
            server: "2001:db8::1".into(),
            port: "1080".into(),
            authentication: true,
            username: "user".into(),
            ..Default::default()
        };
        assert_eq!(form.proxy(), Err(ProxyFormError::AuthenticationIncomplete));

        form.password = "pass".into();
        let method = AccessMethodSetting {
            id: "custom-1".into(),
            name: "Old".into(),
            enabled: false,
            kind: AccessMethodKind::Custom(form.proxy().unwrap()),
        };
        let edited = ProxyForm::edit(&method).unwrap();
        assert!(edited.authentication);
        assert_eq!(edited.submit_label(), "Save");
        let updated = edited.updated_method().unwrap().unwrap();
        assert_eq!(updated.id, "custom-1");
        assert!(!updated.enabled);
    }

    #[test]
    fn built_in_methods_cannot_be_edited() {
        let direct = AccessMethodSetting {
            id: "direct".into(),
            name: "Direct".into(),
            enabled: true,
            kind: AccessMethodKind::Direct,
        };
        assert_eq!(ProxyForm::edit(&direct), None);
    }
}
