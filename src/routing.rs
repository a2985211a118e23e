//! Path routing and the authentication guard in front of it.

use anyhow::Result;

use crate::model::{Identity, TicketId, UserId, UserRef};
use crate::session::Session;
use crate::store::{SharedStore, keys};

pub const LOGIN_PATH: &str = "/login";
pub const TICKET_LIST_PATH: &str = "/ticket";
pub const CREATE_PATH: &str = "/create";
pub const LAST_PATH: &str = "/last";
pub const ROOT_PATH: &str = "/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    /// Ticket list of `user`, or of the caller when `None`.
    TicketList { user: Option<UserId> },
    TicketContent {
        user: UserRef,
        ticket: TicketId,
        file: Option<String>,
    },
    Create,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => LOGIN_PATH.to_string(),
            Route::TicketList { user: None } => TICKET_LIST_PATH.to_string(),
            Route::TicketList { user: Some(id) } => format!("{}/{}", TICKET_LIST_PATH, id),
            Route::TicketContent { user, ticket, file } => {
                let mut path = format!("{}/{}/{}", TICKET_LIST_PATH, user, ticket);
                if let Some(file) = file {
                    path.push('/');
                    path.push_str(&encode_segment(file));
                }
                path
            }
            Route::Create => CREATE_PATH.to_string(),
        }
    }
}

/// Guard state, derived from the session every time a path is resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated(Identity),
}

impl AuthState {
    pub fn from_session(session: &Session) -> Self {
        match session.identity() {
            Some(identity) => AuthState::Authenticated(identity),
            None => AuthState::Unauthenticated,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            AuthState::Unauthenticated => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect(String),
}

/// Maps a path to the route to render, or to the path to go to instead.
/// `last_path` is the path recorded before this session started, used by
/// `/last`.
pub fn resolve(path: &str, auth: &AuthState, last_path: Option<&str>) -> Resolution {
    let path = strip_query(path);

    if matches!(auth, AuthState::Unauthenticated) {
        return if trim_trailing(path) == LOGIN_PATH {
            Resolution::Render(Route::Login)
        } else {
            Resolution::Redirect(LOGIN_PATH.to_string())
        };
    }

    let segments: Vec<&str> = {
        let trimmed = path.trim_start_matches('/');
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        }
    };

    match segments.as_slice() {
        [] => Resolution::Redirect(TICKET_LIST_PATH.to_string()),
        ["ticket", rest @ ..] => resolve_ticket(rest),
        ["create"] => Resolution::Render(Route::Create),
        ["last"] => {
            let target = last_path
                .filter(|p| is_recordable(p) && strip_query(p) != LAST_PATH)
                .unwrap_or(TICKET_LIST_PATH);
            Resolution::Redirect(target.to_string())
        }
        _ => Resolution::Redirect(ROOT_PATH.to_string()),
    }
}

fn resolve_ticket(rest: &[&str]) -> Resolution {
    if rest.iter().any(|s| s.is_empty()) {
        return Resolution::Redirect(TICKET_LIST_PATH.to_string());
    }
    match rest {
        [] => Resolution::Render(Route::TicketList { user: None }),
        [user] => Resolution::Render(Route::TicketList {
            user: parse_user(user),
        }),
        [user, ticket] => Resolution::Render(Route::TicketContent {
            user: UserRef::from_option(parse_user(user)),
            ticket: TicketId::new(decode_segment(ticket)),
            file: None,
        }),
        [user, ticket, file] => Resolution::Render(Route::TicketContent {
            user: UserRef::from_option(parse_user(user)),
            ticket: TicketId::new(decode_segment(ticket)),
            file: Some(decode_segment(file)),
        }),
        _ => Resolution::Redirect(TICKET_LIST_PATH.to_string()),
    }
}

/// Numeric, non-zero ids name a user; anything else means "myself".
fn parse_user(segment: &str) -> Option<UserId> {
    segment.parse::<UserId>().ok().filter(|id| id.0 != 0)
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn trim_trailing(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn is_recordable(path: &str) -> bool {
    let path = trim_trailing(strip_query(path));
    !path.is_empty() && path != LOGIN_PATH
}

/// Stores `path` as the last visited path. The login page is never recorded.
pub fn record_last_path(store: &SharedStore, path: &str) -> Result<()> {
    if !is_recordable(path) {
        return Ok(());
    }
    store.set(keys::LAST_PATH, path)
}

pub fn load_last_path(store: &SharedStore) -> Option<String> {
    match store.get(keys::LAST_PATH) {
        Ok(path) => path.filter(|p| !p.is_empty()),
        Err(err) => {
            tracing::warn!("read last path: {:#}", err);
            None
        }
    }
}

/// Value of `key` in the path's query string, percent-decoded.
pub fn query_param(path: &str, key: &str) -> Option<String> {
    let (_, query) = path.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        (k == key).then(|| decode_segment(&v.replace('+', " ")))
    })
}

/// Encodes a file name as one path segment. `/` and the query and fragment
/// delimiters are escaped so the name survives `resolve`.
pub fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            _ => out.push(ch),
        }
    }
    out
}

/// Percent-decodes a path segment. Malformed escapes are kept verbatim.
pub fn decode_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            out.push(hi << 4 | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/routing_tests.rs"]
mod tests;
