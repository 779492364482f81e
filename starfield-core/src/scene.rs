/// A complete star field: two point layers animated together
use std::cell::RefCell;
use std::rc::Rc;

use rand::{rngs::StdRng, SeedableRng};

use crate::animator::{FrameAnimator, FrameTransforms, TimeState};
use crate::config::StarFieldConfig;
use crate::input::{InputBus, Viewport};
use crate::parallax::PointerParallaxTracker;
use crate::points::{PointCloud, SHOOTING_STAR_HALF_EXTENT, SKY_HALF_EXTENT};
use crate::scheduler::{FrameHandler, FrameTick};
use crate::surface::{Layer, PointStyle, RenderSurface};
use crate::transform::Transform;

pub struct StarField {
    config: StarFieldConfig,
    rng: StdRng,
    sky: PointCloud,
    shooting_stars: PointCloud,
    time: TimeState,
    animator: FrameAnimator,
    // Shared with the parallax tracker, which may overwrite its rotation
    sky_transform: Rc<RefCell<Transform>>,
    shooting_star_transform: Transform,
    presented: [Option<u64>; 2],
}

impl StarField {
    /// Build a star field, seeded from the config or from OS entropy
    pub fn new(config: StarFieldConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(mut config: StarFieldConfig, mut rng: StdRng) -> Self {
        let sky = PointCloud::new(&mut rng, config.count, SKY_HALF_EXTENT);
        let shooting_stars =
            PointCloud::new(&mut rng, config.shooting_star_count, SHOOTING_STAR_HALF_EXTENT);
        config.count = sky.count();
        config.shooting_star_count = shooting_stars.count();
        log::debug!(
            "generated star field: {} stars, {} shooting stars",
            sky.count(),
            shooting_stars.count()
        );

        Self {
            config,
            rng,
            sky,
            shooting_stars,
            time: TimeState::new(),
            animator: FrameAnimator::new(),
            sky_transform: Rc::new(RefCell::new(Transform::identity())),
            shooting_star_transform: Transform::identity(),
            presented: [None, None],
        }
    }

    pub fn config(&self) -> &StarFieldConfig {
        &self.config
    }

    pub fn layer(&self, layer: Layer) -> &PointCloud {
        match layer {
            Layer::Sky => &self.sky,
            Layer::ShootingStars => &self.shooting_stars,
        }
    }

    pub fn sky(&self) -> &PointCloud {
        &self.sky
    }

    pub fn shooting_stars(&self) -> &PointCloud {
        &self.shooting_stars
    }

    pub fn time(&self) -> &TimeState {
        &self.time
    }

    pub fn sky_transform(&self) -> Transform {
        *self.sky_transform.borrow()
    }

    pub fn shooting_star_transform(&self) -> Transform {
        self.shooting_star_transform
    }

    pub fn transform(&self, layer: Layer) -> Transform {
        match layer {
            Layer::Sky => self.sky_transform(),
            Layer::ShootingStars => self.shooting_star_transform(),
        }
    }

    /// Apply new layer sizes, regenerating only the layers whose count changed
    ///
    /// Returns the layers that were regenerated. The seed is only used at
    /// construction and by [`reseed`](Self::reseed).
    pub fn configure(&mut self, config: StarFieldConfig) -> Vec<Layer> {
        let mut regenerated = Vec::new();
        if self.sky.resize(&mut self.rng, config.count) {
            log::debug!("regenerated sky with {} stars", self.sky.count());
            regenerated.push(Layer::Sky);
        }
        if self
            .shooting_stars
            .resize(&mut self.rng, config.shooting_star_count)
        {
            log::debug!(
                "regenerated shooting stars with {} points",
                self.shooting_stars.count()
            );
            regenerated.push(Layer::ShootingStars);
        }
        self.config = StarFieldConfig {
            count: self.sky.count(),
            shooting_star_count: self.shooting_stars.count(),
            ..config
        };
        regenerated
    }

    pub fn set_count(&mut self, count: usize) -> bool {
        let config = StarFieldConfig { count, ..self.config };
        !self.configure(config).is_empty()
    }

    pub fn set_shooting_star_count(&mut self, shooting_star_count: usize) -> bool {
        let config = StarFieldConfig {
            shooting_star_count,
            ..self.config
        };
        !self.configure(config).is_empty()
    }

    /// Redraw both layers from a fresh seed. Time and transforms carry on.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.config.seed = Some(seed);
        self.sky.regenerate(&mut self.rng);
        self.shooting_stars.regenerate(&mut self.rng);
        log::debug!("reseeded star field with {seed}");
    }

    /// Advance time by `delta` seconds and recompute both layer transforms
    pub fn tick(&mut self, delta: f32) -> FrameTransforms {
        let delta = self.time.advance(delta);
        let frame = self.animator.tick(&self.time, delta);

        self.sky_transform.borrow_mut().rotation = frame.sky_rotation;
        self.shooting_star_transform.rotation = frame.shooting_star_rotation;
        self.shooting_star_transform.position = frame.shooting_star_position;

        frame
    }

    /// Tilt the sky towards the pointer for as long as the tracker lives
    pub fn track_pointer(&self, bus: &InputBus, viewport: Viewport) -> PointerParallaxTracker {
        PointerParallaxTracker::attach(bus, viewport, Rc::clone(&self.sky_transform))
    }

    /// Push changed points and current transforms to `surface`
    pub fn present<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        for layer in Layer::ALL {
            let cloud = self.layer(layer);
            let generation = cloud.generation();
            if self.presented[layer.index()] != Some(generation) {
                surface.set_points(layer, cloud.points(), &PointStyle::for_layer(layer));
                self.presented[layer.index()] = Some(generation);
            }
            surface.set_transform(layer, &self.transform(layer));
        }
    }

    /// Force the next [`present`](Self::present) to upload points again
    pub fn invalidate(&mut self) {
        self.presented = [None, None];
    }
}

impl Default for StarField {
    fn default() -> Self {
        Self::new(StarFieldConfig::default())
    }
}

impl FrameHandler for StarField {
    fn on_frame(&mut self, tick: FrameTick) {
        self.tick(tick.delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::MAX_COUNT;

    fn seeded(count: usize, shooting_star_count: usize) -> StarField {
        StarField::new(StarFieldConfig::new(count, shooting_star_count).with_seed(3))
    }

    #[test]
    fn test_layers_sized_from_config() {
        let field = seeded(100, 4);
        assert_eq!(field.sky().points().len(), 100);
        assert_eq!(field.shooting_stars().points().len(), 4);
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = seeded(50, 3);
        let b = seeded(50, 3);
        assert_eq!(a.sky().points(), b.sky().points());
        assert_eq!(a.shooting_stars().points(), b.shooting_stars().points());
    }

    #[test]
    fn test_configure_keeps_unchanged_layer() {
        let mut field = seeded(100, 3);
        let sky = field.sky().points().clone();

        let regenerated = field.configure(StarFieldConfig::new(100, 5));

        assert_eq!(regenerated, vec![Layer::ShootingStars]);
        assert_eq!(field.sky().points(), &sky);
        assert_eq!(field.sky().generation(), 0);
        assert_eq!(field.shooting_stars().points().len(), 5);
    }

    #[test]
    fn test_set_count_noop_when_unchanged() {
        let mut field = seeded(10, 3);
        assert!(!field.set_count(10));
        assert!(field.set_count(11));
        assert!(!field.set_shooting_star_count(3));
    }

    #[test]
    fn test_oversized_counts_are_capped() {
        let field = seeded(usize::MAX, 0);
        assert_eq!(field.config().count, MAX_COUNT);
        assert_eq!(field.sky().points().len(), MAX_COUNT);

        let mut field = seeded(10, 3);
        assert!(field.set_shooting_star_count(usize::MAX));
        assert_eq!(field.config().shooting_star_count, MAX_COUNT);
        assert_eq!(field.shooting_stars().points().len(), MAX_COUNT);
        assert!(!field.set_shooting_star_count(MAX_COUNT + 1));
    }

    #[test]
    fn test_tick_writes_transforms() {
        let mut field = seeded(10, 3);
        field.tick(2.0);

        let sky = field.sky_transform();
        assert!((sky.rotation.x - (0.2f32).sin() * 0.1).abs() < 1e-6);
        assert!((sky.rotation.y - (0.3f32).sin() * 0.1).abs() < 1e-6);

        let shooting = field.shooting_star_transform();
        assert!((shooting.rotation.z - 1.0).abs() < 1e-6);
        assert!((shooting.position.x - (1.0f32).sin() * 500.0).abs() < 1e-3);
        assert!((shooting.position.y - (0.6f32).cos() * 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_reseed_keeps_time() {
        let mut field = seeded(10, 3);
        field.tick(1.0);
        let before = field.sky().points().clone();

        field.reseed(99);

        assert_ne!(field.sky().points(), &before);
        assert_eq!(field.sky().generation(), 1);
        assert!((field.time().elapsed() - 1.0).abs() < 1e-6);
    }
}
