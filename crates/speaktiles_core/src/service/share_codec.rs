//! Share-link codec.
//!
//! # Responsibility
//! - Turn a board into a token that fits in a URL fragment, and back.
//! - Build share links and apply a shared link on load.
//!
//! # Invariants
//! - `decode(encode(board)) == board` for any board, including multi-byte
//!   labels and emoji: text is encoded as UTF-8 bytes before base64.
//! - Decoding validates the whole board before anything is applied.
//! - A processed link is always stripped of its fragment so a reload does
//!   not apply it again.

use crate::model::board::Board;
use crate::repo::kv_repo::KeyValueRepository;
use crate::service::board_store::{BoardError, BoardStore, Commit, StoreResult};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use log::{info, warn};
use url::Url;

/// Fragment parameter carrying the token.
pub const SHARE_FRAGMENT_PREFIX: &str = "board=";

const LENIENT_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_CONFIG);
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_CONFIG);

/// Encodes a board as canonical JSON → UTF-8 → padded standard base64.
pub fn encode(board: &Board) -> Result<String, BoardError> {
    let json = serde_json::to_string(board)
        .map_err(|err| BoardError::InvalidFormat(format!("board is not serializable: {err}")))?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decodes a share token into a validated board.
///
/// Accepts the standard or URL-safe alphabet, with or without padding.
pub fn decode(token: &str) -> StoreResult<Board> {
    let token = token.trim();
    if token.is_empty() {
        return Err(BoardError::InvalidFormat("share token is empty".to_string()));
    }

    let engine = if token.contains(['-', '_']) {
        &LENIENT_URL_SAFE
    } else {
        &LENIENT_STANDARD
    };
    let bytes = engine
        .decode(token)
        .map_err(|err| BoardError::InvalidFormat(format!("share token is not base64: {err}")))?;
    let json = String::from_utf8(bytes)
        .map_err(|_| BoardError::InvalidFormat("share token is not UTF-8 text".to_string()))?;
    Ok(Board::from_json(&json)?)
}

/// Builds `<origin><path>#board=<token>` from the current page URL.
///
/// Any query string or existing fragment of `page` is dropped.
pub fn share_link(page: &Url, board: &Board) -> Result<Url, BoardError> {
    let token = encode(board)?;
    let mut link = page.clone();
    link.set_query(None);
    link.set_fragment(Some(&format!("{SHARE_FRAGMENT_PREFIX}{token}")));
    Ok(link)
}

/// Extracts the share token from a page URL, if it carries one.
pub fn share_token_from_url(url: &Url) -> Option<&str> {
    url.fragment()?
        .strip_prefix(SHARE_FRAGMENT_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Returns `url` without its fragment; path and query are kept.
pub fn strip_fragment(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped
}

/// Result of applying a shared link on load.
#[derive(Debug)]
pub struct ShareImport {
    /// Address to put back in history; the share fragment is gone.
    pub cleaned_url: Url,
    pub outcome: StoreResult<Commit>,
}

/// Applies the share token in `url` to the store, once, on load.
///
/// Returns `None` when the URL carries no share token.
pub fn import_from_url<R: KeyValueRepository>(
    store: &mut BoardStore<R>,
    url: &Url,
) -> Option<ShareImport> {
    let token = share_token_from_url(url)?;
    let outcome = decode(token).and_then(|board| store.replace_board(board));
    match &outcome {
        Ok(_) => info!("event=share_import module=share status=ok"),
        Err(err) => warn!("event=share_import module=share status=rejected error={err}"),
    }

    Some(ShareImport {
        cleaned_url: strip_fragment(url),
        outcome,
    })
}
