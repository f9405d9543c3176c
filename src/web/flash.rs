use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::cookies::parse_cookie;

type HmacSha256 = Hmac<Sha256>;

pub const FLASH_COOKIE: &str = "flash";

/// One-shot notice carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub category: String,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: "success".to_string(),
            message: message.into(),
        }
    }
}

/// `Set-Cookie` value holding `hex(category).hex(message).hex(hmac)`.
pub fn flash_cookie(flash: &FlashMessage, secret: &str) -> Option<String> {
    let payload = format!(
        "{}.{}",
        hex::encode(flash.category.as_bytes()),
        hex::encode(flash.message.as_bytes())
    );
    let sig = sign(&payload, secret)?;
    Some(format!(
        "{FLASH_COOKIE}={payload}.{sig}; Path=/; HttpOnly; SameSite=Lax"
    ))
}

pub fn clear_flash_cookie() -> String {
    format!("{FLASH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Reads the flash cookie; unsigned, tampered or malformed values are ignored.
pub fn read_flash(cookie_header: &str, secret: &str) -> Option<FlashMessage> {
    let value = parse_cookie(cookie_header, FLASH_COOKIE)?;
    let (payload, sig) = value.rsplit_once('.')?;
    let (category, message) = payload.split_once('.')?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&hex::decode(sig).ok()?).ok()?;

    Some(FlashMessage {
        category: String::from_utf8(hex::decode(category).ok()?).ok()?,
        message: String::from_utf8(hex::decode(message).ok()?).ok()?,
    })
}

fn sign(payload: &str, secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}
