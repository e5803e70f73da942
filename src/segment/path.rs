//! Best-path searches over a [`WordNet`].
//!
//! All searches return the ids of the vertices on the path, sentinels
//! excluded.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::model::BigramTable;
use crate::segment::word_net::WordNet;

/// Lowest-cost path by dynamic programming over vertex start positions.
pub fn viterbi(net: &WordNet<'_>, bigram: Option<&BigramTable>) -> Vec<usize> {
    let count = net.vertex_count();
    let mut cost = vec![f64::INFINITY; count];
    let mut previous = vec![usize::MAX; count];
    cost[WordNet::BEGIN] = 0.0;

    let relax = |from: usize, cost: &mut [f64], previous: &mut [usize]| {
        for &to in net.successors(from) {
            let candidate = cost[from] + net.cost(from, to, bigram);
            if candidate < cost[to] {
                cost[to] = candidate;
                previous[to] = from;
            }
        }
    };

    relax(WordNet::BEGIN, &mut cost, &mut previous);
    for position in 0..net.char_len() {
        for &from in net.starting_at(position) {
            if cost[from].is_finite() {
                relax(from, &mut cost, &mut previous);
            }
        }
    }

    backtrack(net, &previous)
}

fn backtrack(net: &WordNet<'_>, previous: &[usize]) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = previous[net.end()];
    while current != usize::MAX && current != WordNet::BEGIN {
        path.push(current);
        current = previous[current];
    }
    path.reverse();
    path
}

#[derive(Debug, Clone, PartialEq)]
struct State {
    cost: f64,
    vertex: usize,
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower costs come first
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Lowest-cost path by Dijkstra's algorithm.
pub fn dijkstra(net: &WordNet<'_>, bigram: Option<&BigramTable>) -> Vec<usize> {
    let count = net.vertex_count();
    let mut cost = vec![f64::INFINITY; count];
    let mut previous = vec![usize::MAX; count];
    let mut heap = BinaryHeap::new();

    cost[WordNet::BEGIN] = 0.0;
    heap.push(State {
        cost: 0.0,
        vertex: WordNet::BEGIN,
    });

    while let Some(State { cost: reached, vertex }) = heap.pop() {
        if vertex == net.end() {
            break;
        }
        if reached > cost[vertex] {
            continue;
        }
        for &next in net.successors(vertex) {
            let candidate = reached + net.cost(vertex, next, bigram);
            if candidate < cost[next] {
                cost[next] = candidate;
                previous[next] = vertex;
                heap.push(State {
                    cost: candidate,
                    vertex: next,
                });
            }
        }
    }

    backtrack(net, &previous)
}

#[derive(Debug, Clone, Copy)]
struct PathEntry {
    cost: f64,
    previous: usize,
    rank: usize,
}

/// The `n` lowest-cost paths, best first.
pub fn n_shortest(net: &WordNet<'_>, bigram: Option<&BigramTable>, n: usize) -> Vec<Vec<usize>> {
    let n = n.max(1);
    let count = net.vertex_count();
    let mut best: Vec<Vec<PathEntry>> = vec![Vec::new(); count];
    best[WordNet::BEGIN].push(PathEntry {
        cost: 0.0,
        previous: usize::MAX,
        rank: 0,
    });

    let extend = |from: usize, best: &mut [Vec<PathEntry>]| {
        let entries = best[from].clone();
        for (rank, entry) in entries.iter().enumerate() {
            for &to in net.successors(from) {
                let candidate = PathEntry {
                    cost: entry.cost + net.cost(from, to, bigram),
                    previous: from,
                    rank,
                };
                let list = &mut best[to];
                let position = list
                    .iter()
                    .position(|e| candidate.cost < e.cost)
                    .unwrap_or(list.len());
                if position < n {
                    list.insert(position, candidate);
                    list.truncate(n);
                }
            }
        }
    };

    extend(WordNet::BEGIN, &mut best);
    for position in 0..net.char_len() {
        for &from in net.starting_at(position) {
            if !best[from].is_empty() {
                extend(from, &mut best);
            }
        }
    }

    (0..best[net.end()].len())
        .map(|rank| {
            let mut path = Vec::new();
            let mut entry = best[net.end()][rank];
            while entry.previous != usize::MAX && entry.previous != WordNet::BEGIN {
                path.push(entry.previous);
                entry = best[entry.previous][entry.rank];
            }
            path.reverse();
            path
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Lexicon;

    fn texts(net: &WordNet<'_>, path: &[usize]) -> Vec<String> {
        path.iter().map(|&id| net.text(id)).collect()
    }

    fn lexicon() -> Lexicon {
        Lexicon::parse_core("中国 ns 1000\n人民 n 1000\n中国人 n 10\n民 n 10\n").unwrap()
    }

    #[test]
    fn test_viterbi_prefers_fewer_words() {
        let core = lexicon();
        let chars: Vec<char> = "中国人民".chars().collect();
        let net = WordNet::build(&chars, &core, None);

        let path = viterbi(&net, None);
        assert_eq!(texts(&net, &path), vec!["中国", "人民"]);
    }

    #[test]
    fn test_dijkstra_agrees_with_viterbi() {
        let core = lexicon();
        let chars: Vec<char> = "中国人民".chars().collect();
        let net = WordNet::build(&chars, &core, None);

        assert_eq!(
            texts(&net, &dijkstra(&net, None)),
            texts(&net, &viterbi(&net, None))
        );
    }

    #[test]
    fn test_bigram_changes_the_best_path() {
        let core = lexicon();
        let bigram = BigramTable::parse("中国人@民 5\n").unwrap();
        let chars: Vec<char> = "中国人民".chars().collect();
        let net = WordNet::build(&chars, &core, None);

        let path = viterbi(&net, Some(&bigram));
        assert_eq!(texts(&net, &path), vec!["中国人", "民"]);
    }

    #[test]
    fn test_n_shortest() {
        let core = lexicon();
        let chars: Vec<char> = "中国人民".chars().collect();
        let net = WordNet::build(&chars, &core, None);

        let paths = n_shortest(&net, None, 2);
        assert_eq!(paths.len(), 2);
        assert_eq!(texts(&net, &paths[0]), texts(&net, &viterbi(&net, None)));
        assert_ne!(paths[0], paths[1]);
    }

    #[test]
    fn test_empty_sentence() {
        let core = lexicon();
        let net = WordNet::build(&[], &core, None);
        assert!(viterbi(&net, None).is_empty());
        assert!(dijkstra(&net, None).is_empty());
    }
}
