//! Swing-point clustering.
//!
//! Candidates are sorted by price and merged in a single sweep: a candidate
//! joins the open cluster while its price sits within tolerance of the
//! cluster's running mean, so membership is transitive by construction and
//! two finished clusters are always separated by more than the tolerance.

use super::swing::Swing;

#[derive(Debug, Clone)]
pub(crate) struct Cluster {
    /// Mean price of the member swings.
    pub price: f64,
    pub members: Vec<Swing>,
}

impl Cluster {
    fn new(swing: Swing) -> Self {
        Self {
            price: swing.price,
            members: vec![swing],
        }
    }

    fn absorb(&mut self, swing: Swing) {
        self.members.push(swing);
        self.price = self.members.iter().map(|s| s.price).sum::<f64>() / self.members.len() as f64;
    }
}

/// Merge swings whose prices lie within `tolerance_frac` (fractional, e.g.
/// 0.005 for 0.5%) of each other.
pub(crate) fn cluster_swings(swings: &[Swing], tolerance_frac: f64) -> Vec<Cluster> {
    if swings.is_empty() {
        return Vec::new();
    }
    let mut sorted = swings.to_vec();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price));

    let mut clusters: Vec<Cluster> = Vec::new();
    let mut current = Cluster::new(sorted[0]);
    for &swing in &sorted[1..] {
        if (swing.price - current.price).abs() <= current.price * tolerance_frac {
            current.absorb(swing);
        } else {
            clusters.push(current);
            current = Cluster::new(swing);
        }
    }
    clusters.push(current);
    clusters
}
