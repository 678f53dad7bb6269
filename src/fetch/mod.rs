//! Fetch probe.
//!
//! A probe turns one source into content or nothing. Network errors, non-2xx
//! answers, oversized bodies and bodies without a single parseable node all
//! end the same way: the attempt is logged, counted, and the probe moves on
//! to the next response shape or gives up. No error leaves this module.
//!
//! Sources expose up to two shapes:
//! - the structured API at `<url>/clash/proxies`
//! - the raw blob at the bare URL
//!
//! `auto` sources are tried in that order; `api` and `raw` sources skip
//! straight to their single shape.

mod context;
mod request;

pub use context::FetchContext;
pub use request::fetch_text;

use log::debug;

use crate::config::API_SUFFIX;
use crate::error_handling::{categorize_fetch_error, ErrorType, InfoType};
use crate::health::FetchMode;
use crate::node::ProxyNode;
use crate::parse::parse_text;

/// Response shape a probe succeeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeShape {
    Api,
    Raw,
}

impl ProbeShape {
    /// URL to request for this shape.
    pub fn target(&self, url: &str) -> String {
        match self {
            ProbeShape::Api => format!("{}{}", url.trim_end_matches('/'), API_SUFFIX),
            ProbeShape::Raw => url.to_string(),
        }
    }

    fn info_type(&self) -> InfoType {
        match self {
            ProbeShape::Api => InfoType::ApiShapeHit,
            ProbeShape::Raw => InfoType::RawShapeHit,
        }
    }
}

/// Content of a successful probe.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    /// Body as received (lossily decoded)
    pub body: String,
    /// Nodes parsed from `body`; never empty
    pub nodes: Vec<ProxyNode>,
    pub shape: ProbeShape,
}

fn shapes_for(mode: FetchMode) -> &'static [ProbeShape] {
    match mode {
        FetchMode::Auto => &[ProbeShape::Api, ProbeShape::Raw],
        FetchMode::Api => &[ProbeShape::Api],
        FetchMode::Raw => &[ProbeShape::Raw],
    }
}

/// Probes one source.
///
/// Succeeds with the first shape whose response is non-empty and parses to
/// at least one node. Returns `None` when every shape fails.
pub async fn probe_source(
    ctx: &FetchContext,
    url: &str,
    mode: FetchMode,
) -> Option<FetchedContent> {
    for &shape in shapes_for(mode) {
        let target = shape.target(url);
        match fetch_text(ctx, &target).await {
            Ok(body) => {
                let nodes = parse_text(&body);
                if nodes.is_empty() {
                    debug!("No nodes in {shape:?} response from {target}");
                    ctx.stats.increment_error(ErrorType::NoNodesParsed);
                    continue;
                }
                debug!("{} nodes from {target} ({shape:?})", nodes.len());
                ctx.stats.increment_info(shape.info_type());
                return Some(FetchedContent { body, nodes, shape });
            }
            Err(e) => {
                debug!("Probe of {target} failed: {e}");
                ctx.stats.increment_error(categorize_fetch_error(&e));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
