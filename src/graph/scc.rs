//! Strongly-connected-component decomposition.
//!
//! Tarjan's algorithm, iterative with an explicit frame stack so deep
//! dependency chains cannot overflow the call stack. O(V+E).

use super::build::ConstraintGraph;

/// Computes the strongly connected components of the graph.
///
/// Each component is a list of node indexes; components come out in
/// Tarjan's reverse-topological completion order.
pub fn strongly_connected_components(graph: &ConstraintGraph) -> Vec<Vec<usize>> {
    const UNVISITED: usize = usize::MAX;

    let n = graph.node_count();
    let mut index = vec![UNVISITED; n];
    let mut low = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    let mut next_index = 0usize;

    // (node, position in its out-edge list)
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next_index;
        low[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            if frame.1 < graph.out_edges(v).len() {
                let (w, _) = graph.out_edges(v)[frame.1];
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    low[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
            } else {
                frames.pop();
                if let Some(parent) = frames.last() {
                    low[parent.0] = low[parent.0].min(low[v]);
                }
                if low[v] == index[v] {
                    let mut component = Vec::new();
                    while let Some(w) = stack.pop() {
                        on_stack[w] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    components.push(component);
                }
            }
        }
    }

    components
}

/// The components that represent circular dependencies: more than one
/// node, or a single node that constrains itself.
pub fn cycles(graph: &ConstraintGraph) -> Vec<Vec<usize>> {
    strongly_connected_components(graph)
        .into_iter()
        .filter(|c| c.len() > 1 || graph.has_self_loop(c[0]))
        .collect()
}
