//! Reading taxonomy annotations out of vertex names.
//!
//! Internal vertices of a reference tree may be named with a taxonomy string
//! such as `'c__Halobacteria; o__Halobacteriales'`, a bootstrap support value
//! such as `0.95`, or both as `'95:f__Halobacteriaceae'`. The functions here
//! separate the taxonomy from the support value and turn multi-rank strings
//! into compact, dot-separated identifiers.

use crate::error::{Result, Tree2TaxError};
use crate::model::{PhyloTree, VertexIndex};
use tracing::warn;

/// Separator between the ranks of a taxonomy string.
pub const RANK_SEPARATOR: &str = "; ";

/// Separator between the ranks of a condensed taxonomy string.
pub const CONDENSED_SEPARATOR: &str = ".";

/// Label used for clusters whose nearest annotated ancestor is the root.
pub const ROOT_TAXONOMY: &str = "Root";

/// Extracts the taxonomy string from a vertex name.
///
/// # Returns
/// * `None` if the name is absent, empty or a bare number (bootstrap value)
/// * `Some(rest)` if the name looks like `<number>:<rest>`
/// * `Some(name)` otherwise
///
/// # Example
/// ```
/// use tree2tax::taxonomy::taxonomy_from_node_name;
///
/// assert_eq!(taxonomy_from_node_name(Some("0.95")), None);
/// assert_eq!(taxonomy_from_node_name(Some("95:g__Halo")), Some("g__Halo"));
/// assert_eq!(taxonomy_from_node_name(Some("g__Halo")), Some("g__Halo"));
/// ```
pub fn taxonomy_from_node_name(name: Option<&str>) -> Option<&str> {
    let name = name.filter(|n| !n.is_empty())?;
    if name.parse::<f64>().is_ok() {
        return None;
    }

    match name.split_once(':') {
        Some((support, rest)) if is_support_value(support) => Some(rest).filter(|r| !r.is_empty()),
        _ => Some(name),
    }
}

/// Returns the taxonomy carried by the vertex at `index`, see [taxonomy_from_node_name].
pub fn vertex_taxonomy(tree: &PhyloTree, index: VertexIndex) -> Option<&str> {
    taxonomy_from_node_name(tree[index].name())
}

/// Bootstrap prefixes are plain digits with an optional decimal point.
fn is_support_value(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

/// Condenses a taxonomy string into a dot-separated identifier, keeping the
/// rank letters since different ranks can share names.
///
/// Tokens without a `<letter>__` prefix are passed through unchanged.
///
/// # Example
/// ```
/// use tree2tax::taxonomy::condense;
///
/// assert_eq!(condense("c__Halo; o__fu"), "cHalo.ofu");
/// ```
pub fn condense(taxonomy: &str) -> String {
    taxonomy
        .split(RANK_SEPARATOR)
        .map(|token| match split_rank_prefix(token) {
            Some((rank, rest)) => format!("{}{}", rank, rest),
            None => {
                if token != ROOT_TAXONOMY {
                    warn!("Unexpected taxonomy token found: {:?}", token);
                }
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(CONDENSED_SEPARATOR)
}

/// Splits `<letter>__<rest>` into the rank letter and the rest.
fn split_rank_prefix(token: &str) -> Option<(char, &str)> {
    let mut chars = token.chars();
    let rank = chars.next().filter(|c| c.is_alphabetic())?;
    chars.as_str().strip_prefix("__").map(|rest| (rank, rest))
}

/// Returns whether any rank of the vertex name has the given prefix,
/// e.g. `'95:f__Halo; g__fu'` has ranks `f` and `g`.
///
/// Ranks are split at `;` with or without a following blank, so
/// `'f__Halo;g__fu'` has rank `g` too. The prefix must open a rank:
/// `'f__Halog__fu'` has no rank `g`.
pub fn has_rank(name: Option<&str>, prefix: &str) -> bool {
    let Some(taxonomy) = taxonomy_from_node_name(name) else {
        return false;
    };
    taxonomy.split(';').any(|token| {
        token
            .trim_start()
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with("__"))
    })
}

/// Collects the condensed taxonomy of every annotated vertex on the path from
/// `descendant` up to (but excluding) `ancestor`, ordered from the ancestor
/// side down.
///
/// # Errors
/// [Tree2TaxError::DisconnectedNodes] if `ancestor` is not an ancestor of
/// `descendant` (or the same vertex).
///
/// # Example
/// ```
/// use tree2tax::newick::parse_str;
/// use tree2tax::taxonomy::missing_taxonomy;
///
/// let tree = parse_str("(((A,B)'g__x',C)'f__y')'o__z';")?;
/// let genus = tree.find_by_name("g__x").unwrap();
/// let taxonomy = missing_taxonomy(&tree, genus, tree.root_index())?;
/// assert_eq!(taxonomy, vec!["fy", "gx"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn missing_taxonomy(tree: &PhyloTree, descendant: VertexIndex, ancestor: VertexIndex) -> Result<Vec<String>> {
    let mut collected = Vec::new();
    let mut current = descendant;
    while current != ancestor {
        if let Some(taxonomy) = vertex_taxonomy(tree, current) {
            collected.push(condense(taxonomy));
        }
        current = tree[current].parent().ok_or(Tree2TaxError::DisconnectedNodes {
            descendant,
            ancestor,
        })?;
    }
    collected.reverse();
    Ok(collected)
}
