//! Tree search that sees through concealed subtrees.
//!
//! Some nodes hide further subtrees (shadow roots) that a plain descendant
//! walk never visits. [`deep_query`] takes an `expand` function that opens
//! those subtrees and a `matches` predicate, so the same search works for
//! any node type and any notion of "concealed".

/// A node with ordered light-tree children.
pub trait TreeNode: Sized {
    /// Light-tree children in document order.
    fn children(&self) -> &[Self];
}

/// Plain descendant query: every descendant of `root` (not `root` itself)
/// matching `matches`, in pre-order. Concealed subtrees are not visited.
pub fn query_all<'a, N, M>(root: &'a N, matches: &M) -> Vec<&'a N>
where
    N: TreeNode,
    M: Fn(&N) -> bool,
{
    let mut found = Vec::new();
    for child in root.children() {
        walk_light(child, &mut |node| {
            if matches(node) {
                found.push(node);
            }
        });
    }
    found
}

/// Deep query.
///
/// Results are gathered in three groups, in this order:
/// 1. light-tree matches under `root`, pre-order;
/// 2. for each light-tree descendant that has concealed subtrees (in
///    pre-order), the deep query of each of those subtrees;
/// 3. the deep query of each concealed subtree of `root` itself.
///
/// Nesting depth is unbounded: a target inside a subtree concealed inside
/// another concealed subtree is still found.
pub fn deep_query<'a, N, E, M>(root: &'a N, expand: &E, matches: &M) -> Vec<&'a N>
where
    N: TreeNode,
    E: Fn(&N) -> &[N],
    M: Fn(&N) -> bool,
{
    let mut found = Vec::new();
    let mut hosts = Vec::new();

    for child in root.children() {
        walk_light(child, &mut |node| {
            if matches(node) {
                found.push(node);
            }
            if !expand(node).is_empty() {
                hosts.push(node);
            }
        });
    }

    for host in hosts {
        for subtree in expand(host) {
            found.extend(deep_query(subtree, expand, matches));
        }
    }

    for subtree in expand(root) {
        found.extend(deep_query(subtree, expand, matches));
    }

    found
}

fn walk_light<'a, N, F>(node: &'a N, visit: &mut F)
where
    N: TreeNode,
    F: FnMut(&'a N),
{
    visit(node);
    for child in node.children() {
        walk_light(child, visit);
    }
}
