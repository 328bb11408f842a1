use crate::ir::TreeNode;

/// Builds an unsorted k-ary tree from `values`.
///
/// The first value becomes the root key; the remaining values are split into at
/// most `k` contiguous, nearly equal chunks which become the child subtrees. The
/// tree does not follow any ordering rule, it only exists to produce trees of a
/// given size quickly. Every node carries `keys_per_node` keys: its value followed
/// by `value + 1`, `value + 2`, ...
pub fn k_ary_tree(k: usize, keys_per_node: usize, values: &[i64]) -> Option<TreeNode> {
    let keys_per_node = keys_per_node.max(1) as i64;
    // Nodes in pre-order, linked by index, then assembled bottom-up.
    let mut nodes: Vec<Option<TreeNode>> = Vec::new();
    let mut children: Vec<Vec<usize>> = Vec::new();
    let mut pending: Vec<(&[i64], Option<usize>)> = vec![(values, None)];
    while let Some((chunk, parent)) = pending.pop() {
        let Some((&key, rest)) = chunk.split_first() else {
            continue;
        };
        let id = nodes.len();
        let keys = (0..keys_per_node).map(|offset| key + offset);
        nodes.push(Some(TreeNode::leaf(keys)));
        children.push(Vec::new());
        if let Some(parent) = parent {
            children[parent].push(id);
        }
        let chunks = split_chunks(rest, k.max(1));
        pending.extend(chunks.into_iter().rev().map(|chunk| (chunk, Some(id))));
    }
    for id in (0..nodes.len()).rev() {
        let subtrees: Vec<Option<TreeNode>> =
            children[id].iter().map(|&child| nodes[child].take()).collect();
        if let Some(node) = nodes[id].as_mut() {
            node.children = subtrees;
        }
    }
    nodes.into_iter().next().flatten()
}

/// `count` sequential values starting at 1.
pub fn sequential_values(count: usize) -> Vec<i64> {
    (1..=count as i64).collect()
}

fn split_chunks(values: &[i64], k: usize) -> Vec<&[i64]> {
    let base = values.len() / k;
    let extra = values.len() % k;
    let mut chunks = Vec::new();
    let mut start = 0;
    for idx in 0..k {
        let len = base + usize::from(idx < extra);
        if len == 0 {
            continue;
        }
        chunks.push(&values[start..start + len]);
        start += len;
    }
    chunks
}
