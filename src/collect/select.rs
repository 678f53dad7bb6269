//! Output-size capping.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::node::ProxyNode;

/// Builds the sampling generator: seeded when `seed` is given, from OS
/// entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Caps `nodes` at `cap` entries.
///
/// At or below the cap the input is returned unchanged. Above it, exactly
/// `cap` nodes are drawn uniformly without replacement; survivors keep their
/// relative order.
pub fn select_output<R: Rng + ?Sized>(
    nodes: Vec<ProxyNode>,
    cap: usize,
    rng: &mut R,
) -> Vec<ProxyNode> {
    if nodes.len() <= cap {
        return nodes;
    }
    let mut picked = rand::seq::index::sample(rng, nodes.len(), cap).into_vec();
    picked.sort_unstable();

    let mut picked = picked.into_iter().peekable();
    nodes
        .into_iter()
        .enumerate()
        .filter_map(|(i, node)| {
            if picked.peek() == Some(&i) {
                picked.next();
                Some(node)
            } else {
                None
            }
        })
        .collect()
}
