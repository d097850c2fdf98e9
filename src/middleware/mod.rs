use actix_web::{dev, guard, FromRequest, HttpRequest};
use actix_session::{Session, SessionExt};
use serde::Serialize;
use std::env;
use std::future::{ready, Ready};
use std::net::IpAddr;

pub const ADMIN_ROLE: &str = "admin";

/// An admin whose session passed the login check. Mutating workflow
/// operations require one.
#[derive(Serialize, Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub username: String,
}

impl FromRequest for AuthenticatedAdmin {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let session = req.get_session();
        match (session.get::<String>("username"), session.get::<String>("role")) {
            (Ok(Some(username)), Ok(Some(role))) if role == ADMIN_ROLE => {
                ready(Ok(AuthenticatedAdmin { username }))
            }
            _ => ready(Err(actix_web::error::ErrorUnauthorized("Not logged in."))),
        }
    }
}

pub fn admin_guard(session: &Session) -> bool {
    session.get::<String>("role").unwrap_or(None).as_deref() == Some(ADMIN_ROLE)
}

pub fn ip_guard(ctx: &guard::GuardContext) -> bool {
    let allowed_ips_str = match env::var("ADMIN_LOGIN_ACCEPT_IP") {
        Ok(val) => val,
        Err(_) => {
            log::warn!("ADMIN_LOGIN_ACCEPT_IP is not set. Denying all admin requests.");
            return false;
        }
    };

    if allowed_ips_str.trim() == "*" {
        return true;
    }

    let trusted_proxies = env::var("TRUSTED_PROXY_IPS").unwrap_or_default();
    let forwarded_for = ctx.head().headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok());

    let peer_addr = match client_ip(ctx.head().peer_addr.map(|addr| addr.ip()), forwarded_for, &trusted_proxies) {
        Some(ip) => ip,
        None => {
            log::warn!("Could not determine peer IP address for admin request.");
            return false;
        }
    };

    let is_allowed = ip_is_listed(&allowed_ips_str, &peer_addr);
    if !is_allowed {
        log::warn!("Blocked admin request from unauthorized IP: {}", peer_addr);
    }
    is_allowed
}

fn ip_is_listed(allowed: &str, ip: &str) -> bool {
    allowed.split(',').any(|candidate| candidate.trim() == ip)
}

/// The address the allowlist is checked against. X-Forwarded-For is only
/// read when the connection comes from a trusted proxy; it is then walked
/// right to left, skipping further trusted hops.
fn client_ip(peer: Option<IpAddr>, forwarded_for: Option<&str>, trusted_proxies: &str) -> Option<String> {
    let peer = peer?.to_string();
    if !ip_is_listed(trusted_proxies, &peer) {
        return Some(peer);
    }
    let Some(header) = forwarded_for else {
        return Some(peer);
    };

    let hops: Vec<&str> = header.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    hops.iter()
        .rev()
        .find(|hop| !ip_is_listed(trusted_proxies, hop))
        .or_else(|| hops.first())
        .map(|hop| hop.to_string())
        .or(Some(peer))
}
