//! Chat address (jid) helpers.
//!
//! A jid has the shape `user[_agent][:device]@server`.

pub const G_US: &str = "g.us";
pub const S_WHATSAPP_NET: &str = "s.whatsapp.net";
const C_US: &str = "c.us";

/// Decoded parts of a jid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullJid {
    pub user: String,
    pub server: String,
    pub agent: Option<u32>,
    pub device: Option<u32>,
}

/// Build a jid from its parts.
pub fn jid_encode(user: &str, server: &str, device: Option<u32>, agent: Option<u32>) -> String {
    let mut jid = user.to_string();
    if let Some(agent) = agent {
        jid.push_str(&format!("_{agent}"));
    }
    if let Some(device) = device {
        jid.push_str(&format!(":{device}"));
    }
    jid.push('@');
    jid.push_str(server);
    jid
}

/// Split a jid into its parts. Returns `None` when there is no `@`.
pub fn jid_decode(jid: &str) -> Option<FullJid> {
    let (user_combined, server) = jid.split_once('@')?;
    let (user_agent, device) = match user_combined.split_once(':') {
        Some((ua, d)) => (ua, d.parse().ok()),
        None => (user_combined, None),
    };
    let (user, agent) = match user_agent.split_once('_') {
        Some((u, a)) => (u, a.parse().ok()),
        None => (user_agent, None),
    };
    Some(FullJid {
        user: user.to_string(),
        server: server.to_string(),
        agent,
        device,
    })
}

/// Strip device/agent and map the legacy user server onto the current one.
pub fn jid_normalized_user(jid: &str) -> String {
    match jid_decode(jid) {
        Some(full) => {
            let server = if full.server == C_US {
                S_WHATSAPP_NET
            } else {
                full.server.as_str()
            };
            jid_encode(&full.user, server, None, None)
        }
        None => String::new(),
    }
}

/// Canonical group jid: ids that already carry a domain pass through,
/// bare ids get the group server appended.
pub fn canonical_group_jid(raw: &str) -> String {
    if raw.contains('@') {
        raw.to_string()
    } else {
        jid_encode(raw, G_US, None, None)
    }
}
