//! Message id generation and clock helpers.

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::jid::jid_decode;

const MESSAGE_ID_PREFIX: &str = "3EB0";

/// Current unix time in seconds.
pub fn unix_timestamp_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Short-form message id: prefix followed by 18 random bytes in upper hex.
pub fn generate_message_id() -> String {
    let bytes: [u8; 18] = rand::thread_rng().gen();
    format!("{MESSAGE_ID_PREFIX}{}", hex::encode_upper(bytes))
}

/// Long-form message id, bound to the sending user and the current second.
///
/// Layout hashed with SHA-256: 8 bytes big-endian timestamp, 20 bytes
/// `<user>@c.us` (zero padded, truncated), 16 random bytes.
pub fn generate_message_id_v2(user_id: Option<&str>) -> String {
    let mut data = [0u8; 8 + 20 + 16];
    data[..8].copy_from_slice(&(unix_timestamp_seconds() as u64).to_be_bytes());

    if let Some(user) = user_id.and_then(jid_decode).map(|j| j.user) {
        if !user.is_empty() {
            let tagged = format!("{user}@c.us");
            let len = tagged.len().min(20);
            data[8..8 + len].copy_from_slice(&tagged.as_bytes()[..len]);
        }
    }

    let random: [u8; 16] = rand::thread_rng().gen();
    data[28..].copy_from_slice(&random);

    let hash = Sha256::digest(data);
    let hex = hex::encode_upper(hash);
    format!("{MESSAGE_ID_PREFIX}{}", &hex[..18])
}
