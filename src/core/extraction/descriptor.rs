//! Local visual descriptors and nearest-neighbor matching

/// One local visual feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor(pub Vec<f32>);

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Descriptor(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Unordered set of descriptors for one image. Compared only via
/// nearest-neighbor matching; no ordering semantics.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    pub fn new(descriptors: Vec<Descriptor>) -> Self {
        Self { descriptors }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.iter()
    }
}

#[inline]
fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Best and second-best squared distances from `query` to `set`.
/// Returns None when the set has fewer than two descriptors.
#[inline]
fn two_nearest(query: &Descriptor, set: &DescriptorSet) -> Option<(f32, f32)> {
    let mut best = f32::INFINITY;
    let mut second = f32::INFINITY;
    for candidate in set.iter() {
        let dist = squared_distance(query.as_slice(), candidate.as_slice());
        if dist < best {
            second = best;
            best = dist;
        } else if dist < second {
            second = dist;
        }
    }
    if second.is_finite() {
        Some((best, second))
    } else {
        None
    }
}

/// Number of descriptors in `query_set` with a confident nearest neighbor in
/// `target_set`: best distance below `ratio` times the second-best distance.
///
/// A target with fewer than two descriptors yields zero confident matches,
/// since the ratio test needs a second neighbor to compare against.
pub fn confident_match_count(
    query_set: &DescriptorSet,
    target_set: &DescriptorSet,
    ratio: f32,
) -> usize {
    // Distances are kept squared, so the ratio is squared too.
    let ratio_sq = ratio * ratio;
    query_set
        .iter()
        .filter(|query| match two_nearest(query, target_set) {
            Some((best, second)) => best < ratio_sq * second,
            None => false,
        })
        .count()
}
