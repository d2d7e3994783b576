/// Path-compressed, union-by-rank disjoint-set, used to collapse the
/// wire-equivalence relation expressed by node-adjacency lines into a
/// partition of canonical node ids.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn grow(&mut self, size: usize) {
        while self.parent.len() < size {
            let next = self.parent.len();
            self.parent.push(next);
            self.rank.push(0);
        }
    }

    pub fn find(&mut self, i: usize) -> usize {
        self.grow(i + 1);
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]);
        }
        self.parent[i]
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}
