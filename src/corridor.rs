//! Corridor compression for maze-like maps.
//!
//! Every run of cells with a single way forward is collapsed into one weighted edge between two
//! decision points (cells with more than two open neighbours, plus the start and the end). The
//! longest route is then searched on that small graph instead of cell by cell.

use bitvec::prelude::*;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::grid::{Grid, Pos};

pub struct CorridorGraph<Ty: EdgeType> {
    graph: Graph<Pos, usize, Ty>,
    start: NodeIndex,
    end: NodeIndex,
}

fn open_neighbors<'a, T, P>(
    grid: &'a Grid<T>,
    passable: &'a P,
    pos: Pos,
) -> impl Iterator<Item = Pos> + 'a
where
    P: Fn(&T) -> bool,
{
    grid.neighbors(pos)
        .map(|(_, p)| p)
        .filter(move |&p| passable(&grid[p]))
}

impl<Ty: EdgeType> CorridorGraph<Ty> {
    /// Compresses `grid` into a graph of decision points.
    ///
    /// `can_step(from, to)` restricts single moves (one-way tiles); a corridor only becomes an edge
    /// if every move along it is allowed. With an undirected `Ty` an edge found from both ends is
    /// stored once. `start` and `end` must lie inside the grid.
    pub fn build<T, P, C>(grid: &Grid<T>, start: Pos, end: Pos, passable: P, can_step: C) -> Self
    where
        P: Fn(&T) -> bool,
        C: Fn(Pos, Pos) -> bool,
    {
        let mut graph: Graph<Pos, usize, Ty> = Graph::default();
        let mut nodes = FxHashMap::default();
        for pos in grid.positions() {
            let junction =
                passable(&grid[pos]) && open_neighbors(grid, &passable, pos).count() > 2;
            if junction || pos == start || pos == end {
                nodes.insert(pos, graph.add_node(pos));
            }
        }

        let follow = |from: Pos, first: Pos| -> Option<(Pos, usize)> {
            let mut previous = from;
            let mut current = first;
            let mut length = 1;
            while !nodes.contains_key(&current) {
                let next = open_neighbors(grid, &passable, current).find(|&p| p != previous)?;
                if !can_step(current, next) {
                    return None;
                }
                previous = current;
                current = next;
                length += 1;
            }
            Some((current, length))
        };

        let decision_points: Vec<(Pos, NodeIndex)> = graph
            .node_indices()
            .map(|index| (graph[index], index))
            .collect();
        for (from, a) in decision_points {
            for first in open_neighbors(grid, &passable, from) {
                if !can_step(from, first) {
                    continue;
                }
                let Some((to, length)) = follow(from, first) else {
                    continue;
                };
                if to == from {
                    continue;
                }
                let b = nodes[&to];
                match graph.find_edge(a, b) {
                    Some(edge) => graph[edge] = graph[edge].max(length),
                    None => {
                        graph.add_edge(a, b, length);
                    }
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "compressed corridors"
        );
        Self {
            graph,
            start: nodes[&start],
            end: nodes[&end],
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Length of the longest route from start to end that visits no decision point twice.
    pub fn longest_route(&self) -> Option<usize> {
        let forks: Vec<Vec<(usize, usize)>> = self
            .graph
            .node_indices()
            .map(|node| {
                let mut out: Vec<_> = self
                    .graph
                    .edges(node)
                    .map(|edge| {
                        let other = if edge.source() == node {
                            edge.target()
                        } else {
                            edge.source()
                        };
                        (other.index(), *edge.weight())
                    })
                    .collect();
                out.sort_unstable_by(|a, b| b.1.cmp(&a.1));
                out
            })
            .collect();

        let mut search = RouteSearch {
            forks: &forks,
            end: self.end.index(),
            visited: bitvec![0; forks.len()],
            best: None,
        };
        search.walk(self.start.index(), 0, self.graph.edge_weights().sum());
        search.best
    }
}

struct RouteSearch<'a> {
    /// Outgoing edges per node, longest first.
    forks: &'a [Vec<(usize, usize)>],
    end: usize,
    visited: BitVec,
    best: Option<usize>,
}

impl RouteSearch<'_> {
    /// `remaining` bounds what can still be added: the weight of every edge that has not been ruled
    /// out yet. Leaving a node rules out all its edges towards unvisited nodes except the one
    /// taken.
    fn walk(&mut self, node: usize, steps: usize, remaining: usize) {
        if node == self.end {
            self.best = self.best.max(Some(steps));
            return;
        }
        if self.best.is_some_and(|best| steps + remaining <= best) {
            return;
        }

        self.visited.set(node, true);
        let open: Vec<(usize, usize)> = self.forks[node]
            .iter()
            .copied()
            .filter(|&(next, _)| !self.visited[next])
            .collect();
        let left = remaining - open.iter().map(|&(_, length)| length).sum::<usize>();
        for (next, length) in open {
            if self.best.is_some_and(|best| steps + length + left <= best) {
                break;
            }
            self.walk(next, steps + length, left);
        }
        self.visited.set(node, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use petgraph::{Directed, Undirected};

    const TWO_JUNCTIONS: &str = indoc! {"
        #.#####
        #.....#
        #.###.#
        #...#.#
        ###.#.#
        #...#.#
        #.###.#
        #.....#
        #####.#
    "};

    fn slopes(grid: &Grid) -> impl Fn(Pos, Pos) -> bool + '_ {
        move |(x, y), (nx, ny)| match grid[(x, y)] {
            b'>' => nx > x,
            b'<' => nx < x,
            b'v' => ny > y,
            b'^' => ny < y,
            _ => true,
        }
    }

    #[test]
    fn two_junctions_take_the_long_way() -> anyhow::Result<()> {
        let grid = Grid::parse(TWO_JUNCTIONS)?;
        let graph =
            CorridorGraph::<Undirected>::build(&grid, (1, 0), (5, 8), |&c| c != b'#', |_, _| true);
        assert_eq!(graph.node_count(), 4);
        // both corridors between the junctions collapse into the longer one
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.longest_route(), Some(16));
        Ok(())
    }

    #[test]
    fn one_way_tiles_cut_the_long_way() -> anyhow::Result<()> {
        let mut grid = Grid::parse(TWO_JUNCTIONS)?;
        grid[(2, 3)] = b'<';
        let can_step = slopes(&grid);
        let graph =
            CorridorGraph::<Directed>::build(&grid, (1, 0), (5, 8), |&c| c != b'#', can_step);
        assert_eq!(graph.longest_route(), Some(12));
        Ok(())
    }

    #[test]
    fn unreachable_end() -> anyhow::Result<()> {
        let grid = Grid::parse(indoc! {"
            #.###
            #..##
            ####.
        "})?;
        let graph =
            CorridorGraph::<Undirected>::build(&grid, (1, 0), (4, 2), |&c| c != b'#', |_, _| true);
        assert_eq!(graph.longest_route(), None);
        Ok(())
    }
}
