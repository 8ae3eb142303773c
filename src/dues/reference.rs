use uuid::Uuid;

use crate::config;

use super::models::{BillingPeriod, MembershipDue};

/// PIX txid field caps out at 25 characters in the static payload format.
const MAX_TXID_LEN: usize = 25;

/// key: dues-reference -> reconciliation key construction
///
/// Period-prefixed so bank statements group naturally, uuid-suffixed for
/// global uniqueness. Local construction only; nothing is registered with a
/// payment network.
pub fn new_reference(period: BillingPeriod, member_id: Uuid) -> String {
    let mut member_tag = member_id.simple().to_string();
    member_tag.truncate(8);
    format!(
        "MD{:04}{:02}-{}-{}",
        period.year(),
        period.month(),
        member_tag,
        Uuid::new_v4().simple()
    )
}

/// Merchant fields stamped into every static payload.
#[derive(Debug, Clone)]
pub struct PixConfig {
    pub key: String,
    pub merchant_name: String,
    pub merchant_city: String,
}

impl PixConfig {
    /// Reads the configured PIX settings; `None` disables payload
    /// generation while leaving the rest of the lifecycle untouched.
    pub fn from_env() -> Option<Self> {
        config::PIX_KEY.clone().map(|key| Self {
            key,
            merchant_name: config::PIX_MERCHANT_NAME.clone(),
            merchant_city: config::PIX_MERCHANT_CITY.clone(),
        })
    }
}

/// key: dues-payload -> BR Code (EMV-MPM) static payload
///
/// Renders the "copia e cola" string members paste into their banking app:
/// TLV fields carrying the PIX key, currency 986 (BRL), the due amount,
/// merchant name/city and the payment reference as txid, closed by a
/// CRC16-CCITT checksum. Offline only; this is the seam where a real
/// gateway integration would plug in.
pub fn static_payload(due: &MembershipDue, pix: &PixConfig) -> String {
    let merchant_account = [field("00", "BR.GOV.BCB.PIX"), field("01", &pix.key)].concat();

    let mut txid = due.payment_reference.clone();
    txid.truncate(MAX_TXID_LEN);
    let additional_data = field("05", &txid);

    let amount = format!("{:.2}", due.amount);

    let mut payload = String::new();
    payload.push_str(&field("00", "01"));
    payload.push_str(&field("26", &merchant_account));
    payload.push_str(&field("52", "0000"));
    payload.push_str(&field("53", "986"));
    payload.push_str(&field("54", &amount));
    payload.push_str(&field("58", "BR"));
    payload.push_str(&field("59", &label(&pix.merchant_name, 25)));
    payload.push_str(&field("60", &label(&pix.merchant_city, 15)));
    payload.push_str(&field("62", &additional_data));
    // CRC field covers its own id and length.
    payload.push_str("6304");
    let crc = crc16_ccitt(payload.as_bytes());
    payload.push_str(&format!("{crc:04X}"));
    payload
}

fn field(id: &str, value: &str) -> String {
    format!("{id}{:02}{value}", value.len())
}

fn label(raw: &str, max: usize) -> String {
    let mut cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .to_ascii_uppercase();
    cleaned.truncate(max);
    cleaned
}

/// CRC16-CCITT (polynomial 0x1021, initial 0xFFFF), as mandated by the
/// EMV merchant-presented QR specification.
fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
