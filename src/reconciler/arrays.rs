//! Keyed reconciliation of one node sequence into another.

use super::Adapter;
use std::collections::HashMap;

/// Insert `new` where `old` is, then remove `old`.
pub(super) fn replace_node<A: Adapter + ?Sized>(
    adapter: &A,
    parent: &A::Node,
    new: &A::Node,
    old: &A::Node,
) {
    adapter.insert_node(parent, new, Some(old));
    adapter.remove_node(parent, old);
}

/// Turn the children `a` of `parent` into `b`, matching nodes by identity.
///
/// Common prefixes and suffixes are skipped untouched. What remains is
/// resolved with, in order of preference: plain insertion, plain removal,
/// a two-move swap of the span's ends, and finally an index map that keeps
/// in-order runs in place and moves or replaces the rest.
pub(super) fn reconcile_arrays<A: Adapter + ?Sized>(
    adapter: &A,
    parent: &A::Node,
    mut a: Vec<A::Node>,
    b: &[A::Node],
) {
    let b_len = b.len();
    let mut a_end = a.len();
    let mut b_end = b_len;
    let mut a_start = 0;
    let mut b_start = 0;
    let after = a.last().and_then(|last| adapter.get_next_sibling(last));
    let mut map: Option<HashMap<A::Node, usize>> = None;

    while a_start < a_end || b_start < b_end {
        // Common prefix
        if a_start < a_end && b_start < b_end && a[a_start] == b[b_start] {
            a_start += 1;
            b_start += 1;
            continue;
        }

        // Common suffix
        while a_end > a_start && b_end > b_start && a[a_end - 1] == b[b_end - 1] {
            a_end -= 1;
            b_end -= 1;
        }

        if a_end == a_start {
            // Only insertions left: place them before whatever follows the span
            let anchor = if b_end < b_len {
                if b_start > 0 {
                    adapter.get_next_sibling(&b[b_start - 1])
                } else {
                    Some(b[b_end - b_start].clone())
                }
            } else {
                after.clone()
            };
            while b_start < b_end {
                adapter.insert_node(parent, &b[b_start], anchor.as_ref());
                b_start += 1;
            }
        } else if b_end == b_start {
            // Only removals left
            while a_start < a_end {
                if map.as_ref().is_none_or(|m| !m.contains_key(&a[a_start])) {
                    adapter.remove_node(parent, &a[a_start]);
                }
                a_start += 1;
            }
        } else if a[a_start] == b[b_end - 1] && b[b_start] == a[a_end - 1] {
            // The span's ends swapped places
            a_end -= 1;
            let tail_anchor = adapter.get_next_sibling(&a[a_end]);
            let head_anchor = adapter.get_next_sibling(&a[a_start]);
            adapter.insert_node(parent, &b[b_start], head_anchor.as_ref());
            a_start += 1;
            b_start += 1;
            b_end -= 1;
            adapter.insert_node(parent, &b[b_end], tail_anchor.as_ref());
            a[a_end] = b[b_end].clone();
        } else {
            let index_of = map.get_or_insert_with(|| {
                (b_start..b_end).map(|i| (b[i].clone(), i)).collect()
            });
            match index_of.get(&a[a_start]).copied() {
                Some(index) if b_start < index && index < b_end => {
                    // Length of the in-order run starting at a[a_start]
                    let mut i = a_start;
                    let mut sequence = 1;
                    loop {
                        i += 1;
                        if i >= a_end || i >= b_end {
                            break;
                        }
                        if index_of.get(&a[i]) != Some(&(index + sequence)) {
                            break;
                        }
                        sequence += 1;
                    }

                    if sequence > index - b_start {
                        // Cheaper to insert the new nodes ahead of the run
                        let anchor = a[a_start].clone();
                        while b_start < index {
                            adapter.insert_node(parent, &b[b_start], Some(&anchor));
                            b_start += 1;
                        }
                    } else {
                        replace_node(adapter, parent, &b[b_start], &a[a_start]);
                        a_start += 1;
                        b_start += 1;
                    }
                }
                Some(_) => a_start += 1,
                None => {
                    adapter.remove_node(parent, &a[a_start]);
                    a_start += 1;
                }
            }
        }
    }
}
