/// Random point clouds for the star layers
use nalgebra::Point3;
use rand::{distributions::Uniform, Rng};

/// Half extent of the dense sky cube
pub const SKY_HALF_EXTENT: f32 = 1000.0;

/// Half extent of the shooting star cube
pub const SHOOTING_STAR_HALF_EXTENT: f32 = 500.0;

/// Largest number of points a single layer will hold
pub const MAX_COUNT: usize = 1_000_000;

/// Cap `count` at [`MAX_COUNT`]
pub fn clamp_count(count: usize) -> usize {
    if count > MAX_COUNT {
        log::warn!("{count} points requested, capping the layer at {MAX_COUNT}");
        MAX_COUNT
    } else {
        count
    }
}

/// An immutable, fixed-length set of 3D points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Point3<f32>>,
}

impl PointSet {
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point3<f32>> {
        self.points.iter()
    }

    /// Packed `x, y, z` buffer, three scalars per point
    pub fn to_flat(&self) -> Vec<f32> {
        self.points
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }
}

impl From<Vec<Point3<f32>>> for PointSet {
    fn from(points: Vec<Point3<f32>>) -> Self {
        Self { points }
    }
}

/// Generate `count` points drawn uniformly from the cube `[-half_extent, half_extent]^3`
///
/// Every axis of every point is an independent draw. A count of zero gives an
/// empty set and counts above [`MAX_COUNT`] are capped.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, count: usize, half_extent: f32) -> PointSet {
    let count = clamp_count(count);
    if count == 0 {
        return PointSet::empty();
    }

    let half = half_extent.abs();
    let axis = Uniform::new_inclusive(-half, half);

    let points = (0..count)
        .map(|_| Point3::new(rng.sample(&axis), rng.sample(&axis), rng.sample(&axis)))
        .collect();

    PointSet { points }
}

/// A point set memoized on its count
///
/// The set is only regenerated when the requested count changes. Other
/// parameters, such as the extent, take effect on the next regeneration.
#[derive(Debug, Clone)]
pub struct PointCloud {
    count: usize,
    half_extent: f32,
    points: PointSet,
    generation: u64,
}

impl PointCloud {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, count: usize, half_extent: f32) -> Self {
        let count = clamp_count(count);
        Self {
            count,
            half_extent,
            points: generate(rng, count, half_extent),
            generation: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// Bumped on every regeneration
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Regenerate if `count` differs from the current one. Returns whether it did.
    pub fn resize<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> bool {
        let count = clamp_count(count);
        if count == self.count {
            return false;
        }

        self.count = count;
        self.regenerate(rng);
        true
    }

    /// Record a new extent without touching the current points
    pub fn set_half_extent(&mut self, half_extent: f32) {
        self.half_extent = half_extent;
    }

    /// Draw a fresh set with the current count and extent
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.points = generate(rng, self.count, self.half_extent);
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn within(set: &PointSet, h: f32) -> bool {
        set.iter()
            .all(|p| [p.x, p.y, p.z].iter().all(|c| (-h..=h).contains(c)))
    }

    #[test]
    fn test_generate_count_and_range() {
        let mut rng = rng();
        for count in [1, 3, 5, 5000] {
            let set = generate(&mut rng, count, SKY_HALF_EXTENT);
            assert_eq!(set.len(), count);
            assert_eq!(set.to_flat().len(), count * 3);
            assert!(within(&set, SKY_HALF_EXTENT));
        }
    }

    #[test]
    fn test_generate_zero_is_empty() {
        let set = generate(&mut rng(), 0, SKY_HALF_EXTENT);
        assert!(set.is_empty());
        assert!(set.to_flat().is_empty());
    }

    #[test]
    fn test_generate_is_seed_deterministic() {
        let a = generate(&mut rng(), 16, SHOOTING_STAR_HALF_EXTENT);
        let b = generate(&mut rng(), 16, SHOOTING_STAR_HALF_EXTENT);
        assert_eq!(a, b);

        let c = generate(&mut StdRng::seed_from_u64(8), 16, SHOOTING_STAR_HALF_EXTENT);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generate_matches_uniform_draw_order() {
        let set = generate(&mut rng(), 2, 10.0);

        let mut expected = rng();
        let axis = Uniform::new_inclusive(-10.0f32, 10.0);
        let flat: Vec<f32> = (0..6).map(|_| expected.sample(&axis)).collect();

        assert_eq!(set.to_flat(), flat);
    }

    #[test]
    fn test_same_count_different_extent() {
        let mut rng = rng();
        let wide = generate(&mut rng, 200, 1000.0);
        let narrow = generate(&mut rng, 200, 1.0);

        assert_eq!(wide.len(), narrow.len());
        assert!(within(&narrow, 1.0));
        assert!(wide.iter().any(|p| p.x.abs() > 1.0));
    }

    #[test]
    fn test_cloud_regenerates_only_on_count_change() {
        let mut rng = rng();
        let mut cloud = PointCloud::new(&mut rng, 10, SKY_HALF_EXTENT);
        let before = cloud.points().clone();

        assert!(!cloud.resize(&mut rng, 10));
        assert_eq!(cloud.generation(), 0);
        assert_eq!(cloud.points(), &before);

        cloud.set_half_extent(1.0);
        assert_eq!(cloud.points(), &before);
        assert_eq!(cloud.generation(), 0);

        assert!(cloud.resize(&mut rng, 12));
        assert_eq!(cloud.generation(), 1);
        assert_eq!(cloud.points().len(), 12);
        assert!(within(cloud.points(), 1.0));
    }

    #[test]
    fn test_oversized_counts_are_capped() {
        let mut rng = rng();
        assert_eq!(clamp_count(usize::MAX), MAX_COUNT);
        assert_eq!(clamp_count(MAX_COUNT), MAX_COUNT);

        let mut cloud = PointCloud::new(&mut rng, usize::MAX, SHOOTING_STAR_HALF_EXTENT);
        assert_eq!(cloud.count(), MAX_COUNT);
        assert_eq!(cloud.points().len(), MAX_COUNT);

        // Already at the cap, so nothing is regenerated
        assert!(!cloud.resize(&mut rng, i64::MAX as usize));
        assert_eq!(cloud.generation(), 0);
    }

    #[test]
    fn test_cloud_resize_to_zero() {
        let mut rng = rng();
        let mut cloud = PointCloud::new(&mut rng, 4, SHOOTING_STAR_HALF_EXTENT);
        assert!(cloud.resize(&mut rng, 0));
        assert!(cloud.points().is_empty());
    }
}
