//! Complete-linkage collapsing of tip pairs, pruning the working tree.

use crate::error::{Result, Tree2TaxError};
use crate::model::{PhyloTree, VertexIndex};
use std::collections::{BTreeSet, HashMap};
use tracing::{Level, debug, enabled};

/// Greatest distance from a collapsed vertex down to any tip absorbed into it.
///
/// Carried across thresholds applied to the same working tree, so that a
/// clade collapsed at a smaller threshold keeps its radius.
pub type CladeDistances = HashMap<VertexIndex, f64>;

/// Collapses sibling tip pairs of `tree` as long as all tips absorbed into
/// a clade stay within `threshold` of each other.
///
/// A tip merges with its sibling only if their parent has exactly these two
/// children; both are then detached and the parent becomes a tip itself,
/// recording in `clade_distances` the larger of the two distances down from it.
///
/// # Arguments
/// * `tree` - Working tree, pruned in place
/// * `threshold` - Maximal tree distance within a clade
/// * `clade_distances` - Absorbed distances from previous (smaller) thresholds,
///   updated in place
///
/// # Errors
/// [Tree2TaxError::InvalidThreshold] for a negative or NaN threshold,
/// [Tree2TaxError::CorruptTree] if a merged tip could not be detached.
pub fn destructively_cluster_tree(
    tree: &mut PhyloTree,
    threshold: f64,
    clade_distances: &mut CladeDistances,
) -> Result<()> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(Tree2TaxError::InvalidThreshold(threshold));
    }

    let mut tips_to_evaluate: BTreeSet<VertexIndex> = tree.tips().into_iter().collect();
    debug!("Clustering tree with {} tips at threshold {}", tips_to_evaluate.len(), threshold);

    while let Some(tip) = tips_to_evaluate.pop_first() {
        let vertex = &tree[tip];
        debug!("Evaluating tip {}/{:?}", tip, vertex.name());
        let Some(parent) = vertex.parent() else {
            continue;
        };
        if !vertex.is_tip() {
            continue;
        }

        let bro = match tree[parent].children() {
            &[first, second] if first == tip => second,
            &[first, second] if second == tip => first,
            _ => {
                debug!("Parent has more than two children, ignoring this tip");
                continue;
            }
        };
        if !tree[bro].is_tip() {
            debug!("The sibling is not a single tip, ignoring this tip");
            continue;
        }

        // Both leave the candidates, whether merged or not
        tips_to_evaluate.remove(&bro);

        let absorbed = |i: VertexIndex| clade_distances.get(&i).copied().unwrap_or(0.0);
        let distance_to_bro = tree[tip].length() + tree[bro].length() + absorbed(tip) + absorbed(bro);
        debug!("Found sibling {}/{:?} at distance {}", bro, tree[bro].name(), distance_to_bro);
        if distance_to_bro > threshold {
            continue;
        }

        let max_distance = [tip, bro]
            .iter()
            .map(|&n| absorbed(n) + tree[n].length())
            .fold(0.0, f64::max);

        for child in [bro, tip] {
            if !tree.remove_child(parent, child) {
                return Err(Tree2TaxError::CorruptTree { parent, child });
            }
        }
        clade_distances.insert(parent, max_distance);
        tips_to_evaluate.insert(parent);
        debug!("Below threshold, merged into {} with maximal distance {}", parent, max_distance);
    }

    if enabled!(Level::DEBUG) {
        debug!("Tree after clustering:\n{}", tree.ascii_art());
    }
    Ok(())
}
