//! Dependency cycle detection.
//!
//! Three-colour depth-first search over the "enables" edges, driven by an
//! explicit stack so pathological step lists cannot exhaust the call stack.
//! Cycles are a diagnostic: scheduling proceeds regardless.

use crate::graph::DependencyGraph;
use crate::interner::StepIdx;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// Find the dependency cycles of a graph.
///
/// Each cycle lists step positions in execution order (a step before the steps
/// that require it), starting from the first step of the cycle reached by the
/// traversal. Roots are visited in input order, so the result is deterministic.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<StepIdx>> {
    let n = graph.len();
    let mut color = vec![Color::Unvisited; n];
    // Position of each in-progress node on `path`.
    let mut path_pos: Vec<Option<usize>> = vec![None; n];
    let mut path: Vec<StepIdx> = Vec::new();
    // (node, index of the next successor to visit)
    let mut stack: Vec<(StepIdx, usize)> = Vec::new();
    let mut cycles = Vec::new();

    for root in 0..n as StepIdx {
        if color[root as usize] != Color::Unvisited {
            continue;
        }
        color[root as usize] = Color::InProgress;
        path_pos[root as usize] = Some(path.len());
        path.push(root);
        stack.push((root, 0));

        while let Some(&(node, next)) = stack.last() {
            let successors = &graph.enables[node as usize];
            if next < successors.len() {
                let succ = successors[next];
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                match color[succ as usize] {
                    Color::Unvisited => {
                        color[succ as usize] = Color::InProgress;
                        path_pos[succ as usize] = Some(path.len());
                        path.push(succ);
                        stack.push((succ, 0));
                    }
                    Color::InProgress => {
                        if let Some(first) = path_pos[succ as usize] {
                            cycles.push(path[first..].to_vec());
                        }
                    }
                    Color::Done => {}
                }
            } else {
                stack.pop();
                path.pop();
                path_pos[node as usize] = None;
                color[node as usize] = Color::Done;
            }
        }
    }

    cycles
}
