use thiserror::Error;

/// User record returned by the identity service.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// Request metadata the admin policy looks at.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub device_fp: Option<String>,
    pub forwarded_for: Option<String>,
}

impl RequestMeta {
    /// First hop of `x-forwarded-for`, trimmed.
    pub fn client_ip(&self) -> Option<&str> {
        self.forwarded_for
            .as_deref()
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminDenied {
    #[error("no authenticated user")]
    NoUser,
    #[error("user has no email")]
    NoEmail,
    #[error("email not allowed")]
    Email,
    #[error("device fingerprint mismatch")]
    Device,
    #[error("ip not in allowlist")]
    Ip,
    #[error("no admin policy configured")]
    Unconfigured,
}

/// Static allowlist deciding who is an admin.
///
/// Each check is skipped when its setting is empty; configured checks must all
/// pass. With nothing configured, access is denied unless `allow_unconfigured`.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    pub email: Option<String>,
    pub device_fp: Option<String>,
    pub ips: Vec<String>,
    pub allow_unconfigured: bool,
}

impl AdminPolicy {
    pub fn is_unconfigured(&self) -> bool {
        self.email.is_none() && self.device_fp.is_none() && self.ips.is_empty()
    }

    pub fn authorize(&self, user: Option<&AuthUser>, meta: &RequestMeta) -> Result<(), AdminDenied> {
        let user = user.ok_or(AdminDenied::NoUser)?;
        let email = user
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or(AdminDenied::NoEmail)?;

        if self.is_unconfigured() && !self.allow_unconfigured {
            return Err(AdminDenied::Unconfigured);
        }

        if let Some(allowed) = &self.email {
            if allowed.to_lowercase() != email.to_lowercase() {
                return Err(AdminDenied::Email);
            }
        }

        if let Some(fp) = &self.device_fp {
            if meta.device_fp.as_deref() != Some(fp.as_str()) {
                return Err(AdminDenied::Device);
            }
        }

        if !self.ips.is_empty() {
            let ip = meta.client_ip().ok_or(AdminDenied::Ip)?;
            if !self.ips.iter().any(|allowed| allowed == ip) {
                return Err(AdminDenied::Ip);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> AuthUser {
        AuthUser {
            id: "u1".to_string(),
            email: Some(email.to_string()),
        }
    }

    fn meta(fp: Option<&str>, xff: Option<&str>) -> RequestMeta {
        RequestMeta {
            device_fp: fp.map(String::from),
            forwarded_for: xff.map(String::from),
        }
    }

    fn full_policy() -> AdminPolicy {
        AdminPolicy {
            email: Some("Boss@Shop.com".to_string()),
            device_fp: Some("fp-123".to_string()),
            ips: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
            allow_unconfigured: false,
        }
    }

    #[test]
    fn denies_without_user() {
        let policy = AdminPolicy {
            allow_unconfigured: true,
            ..Default::default()
        };
        assert_eq!(policy.authorize(None, &RequestMeta::default()), Err(AdminDenied::NoUser));
    }

    #[test]
    fn denies_user_without_email() {
        let policy = AdminPolicy {
            allow_unconfigured: true,
            ..Default::default()
        };
        let u = AuthUser {
            id: "u1".to_string(),
            email: None,
        };
        assert_eq!(
            policy.authorize(Some(&u), &RequestMeta::default()),
            Err(AdminDenied::NoEmail)
        );
    }

    #[test]
    fn unconfigured_policy_denies_by_default() {
        let policy = AdminPolicy::default();
        assert_eq!(
            policy.authorize(Some(&user("a@b.c")), &RequestMeta::default()),
            Err(AdminDenied::Unconfigured)
        );
    }

    #[test]
    fn unconfigured_policy_allows_any_user_when_opted_in() {
        let policy = AdminPolicy {
            allow_unconfigured: true,
            ..Default::default()
        };
        assert!(policy.authorize(Some(&user("a@b.c")), &RequestMeta::default()).is_ok());
    }

    #[test]
    fn all_checks_passing_allows() {
        let m = meta(Some("fp-123"), Some("10.0.0.2, 172.16.0.1"));
        assert!(full_policy().authorize(Some(&user("boss@shop.COM")), &m).is_ok());
    }

    #[test]
    fn email_mismatch_denies() {
        let m = meta(Some("fp-123"), Some("10.0.0.1"));
        assert_eq!(
            full_policy().authorize(Some(&user("intruder@shop.com")), &m),
            Err(AdminDenied::Email)
        );
    }

    #[test]
    fn email_match_folds_non_ascii_case() {
        let policy = AdminPolicy {
            email: Some("ÉLISE@boutique.fr".to_string()),
            ..Default::default()
        };
        assert!(policy
            .authorize(Some(&user("élise@BOUTIQUE.fr")), &RequestMeta::default())
            .is_ok());
        assert_eq!(
            policy.authorize(Some(&user("elise@boutique.fr")), &RequestMeta::default()),
            Err(AdminDenied::Email)
        );
    }

    #[test]
    fn device_fingerprint_is_exact_match() {
        let m = meta(Some("FP-123"), Some("10.0.0.1"));
        assert_eq!(
            full_policy().authorize(Some(&user("boss@shop.com")), &m),
            Err(AdminDenied::Device)
        );
        let m = meta(None, Some("10.0.0.1"));
        assert_eq!(
            full_policy().authorize(Some(&user("boss@shop.com")), &m),
            Err(AdminDenied::Device)
        );
    }

    #[test]
    fn only_first_forwarded_hop_is_checked() {
        let m = meta(Some("fp-123"), Some("192.168.1.9, 10.0.0.1"));
        assert_eq!(
            full_policy().authorize(Some(&user("boss@shop.com")), &m),
            Err(AdminDenied::Ip)
        );
    }

    #[test]
    fn missing_forwarded_header_fails_ip_check() {
        let m = meta(Some("fp-123"), None);
        assert_eq!(
            full_policy().authorize(Some(&user("boss@shop.com")), &m),
            Err(AdminDenied::Ip)
        );
    }

    #[test]
    fn single_configured_check_is_enough() {
        let policy = AdminPolicy {
            device_fp: Some("fp".to_string()),
            ..Default::default()
        };
        assert!(policy
            .authorize(Some(&user("anyone@x.y")), &meta(Some("fp"), None))
            .is_ok());
    }
}
