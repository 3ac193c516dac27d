//! Render loop driver: owns the active galaxy renderable, rebuilds it on
//! parameter changes, and feeds elapsed time to its shader.

use galaxy_gen::{GenerateError, ParameterSet, RandomSource, generate};
use galaxy_render::{PointScene, ShadingConfig};
use tracing::info;

/// Whether a galaxy is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing generated yet.
    Idle,
    /// A renderable is in the scene.
    Active,
}

/// Drives one galaxy renderable inside a [`PointScene`].
///
/// At most one renderable exists at a time: [`regenerate`](Self::regenerate)
/// tears the old one down before creating its replacement.
pub struct GalaxyDriver<S: PointScene> {
    params: ParameterSet,
    pixel_ratio: f32,
    active: Option<ActiveGalaxy<S::Handle>>,
    generation: u64,
}

struct ActiveGalaxy<H> {
    handle: H,
    point_count: usize,
}

impl<S: PointScene> GalaxyDriver<S> {
    pub fn new(params: ParameterSet, pixel_ratio: f32) -> Self {
        Self {
            params,
            pixel_ratio,
            active: None,
            generation: 0,
        }
    }

    /// Build a new galaxy from the current parameters and swap it in.
    ///
    /// The point set is generated before anything is torn down, so an invalid
    /// parameter set leaves the current galaxy on screen. Returns the number
    /// of points in the new galaxy.
    pub fn regenerate(
        &mut self,
        scene: &mut S,
        rng: &mut impl RandomSource,
    ) -> Result<usize, GenerateError> {
        let attributes = generate(&self.params, rng)?;

        if let Some(old) = self.active.take() {
            scene.remove(&old.handle);
            scene.dispose(old.handle);
        }

        let shading = self.shading_config();
        let handle = scene.create(&attributes, &shading);
        scene.add(&handle);

        let point_count = attributes.len();
        self.active = Some(ActiveGalaxy {
            handle,
            point_count,
        });
        self.generation += 1;
        info!(
            "Galaxy generated: {point_count} points, {} branches, radius {} (generation {})",
            self.params.branch_count, self.params.radius, self.generation
        );
        Ok(point_count)
    }

    /// Write `elapsed_seconds * animation_speed` to the active galaxy's time
    /// uniform. Returns the written value, or `None` when idle.
    pub fn tick(&mut self, scene: &mut S, elapsed_seconds: f64) -> Option<f32> {
        let active = self.active.as_ref()?;
        let time = (elapsed_seconds * f64::from(self.params.animation_speed)) as f32;
        scene.set_time(&active.handle, time);
        Some(time)
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Edits apply to the next [`regenerate`](Self::regenerate), except
    /// `animation_speed`, which the next [`tick`](Self::tick) reads.
    pub fn params_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }

    pub fn set_params(&mut self, params: ParameterSet) {
        self.params = params;
    }

    /// Takes effect on the next regeneration.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio;
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn state(&self) -> DriverState {
        if self.active.is_some() {
            DriverState::Active
        } else {
            DriverState::Idle
        }
    }

    /// Points in the active galaxy, zero when idle.
    pub fn point_count(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.point_count)
    }

    /// Successful generations so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn shading_config(&self) -> ShadingConfig {
        ShadingConfig::new(self.params.point_size, self.pixel_ratio, self.params.brightness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_gen::{PointAttributeSet, RngSource};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(u32, usize),
        Add(u32),
        Remove(u32),
        Dispose(u32),
        SetTime(u32, f32),
    }

    /// Records every scene call; handles are plain ids.
    #[derive(Default)]
    struct MockScene {
        calls: Vec<Call>,
        next: u32,
        live: Vec<u32>,
        visible: Vec<u32>,
        last_shading: Option<ShadingConfig>,
    }

    struct MockHandle(u32);

    impl PointScene for MockScene {
        type Handle = MockHandle;

        fn create(&mut self, attributes: &PointAttributeSet, shading: &ShadingConfig) -> MockHandle {
            let id = self.next;
            self.next += 1;
            self.calls.push(Call::Create(id, attributes.len()));
            self.live.push(id);
            self.last_shading = Some(*shading);
            MockHandle(id)
        }

        fn add(&mut self, handle: &MockHandle) {
            self.calls.push(Call::Add(handle.0));
            self.visible.push(handle.0);
        }

        fn remove(&mut self, handle: &MockHandle) {
            self.calls.push(Call::Remove(handle.0));
            self.visible.retain(|id| *id != handle.0);
        }

        fn dispose(&mut self, handle: MockHandle) {
            self.calls.push(Call::Dispose(handle.0));
            self.live.retain(|id| *id != handle.0);
        }

        fn set_time(&mut self, handle: &MockHandle, time: f32) {
            self.calls.push(Call::SetTime(handle.0, time));
        }
    }

    fn small_params() -> ParameterSet {
        ParameterSet {
            total_points: 500,
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_idle() {
        let mut scene = MockScene::default();
        let mut driver: GalaxyDriver<MockScene> = GalaxyDriver::new(small_params(), 1.0);
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.point_count(), 0);
        assert_eq!(driver.tick(&mut scene, 3.0), None);
        assert!(scene.calls.is_empty());
    }

    #[test]
    fn test_first_generation_activates() {
        let mut scene = MockScene::default();
        let mut driver = GalaxyDriver::new(small_params(), 1.0);
        let count = driver
            .regenerate(&mut scene, &mut RngSource::seeded(1))
            .unwrap();

        assert_eq!(count, 500);
        assert_eq!(driver.state(), DriverState::Active);
        assert_eq!(driver.generation(), 1);
        assert_eq!(scene.calls, vec![Call::Create(0, 500), Call::Add(0)]);
    }

    #[test]
    fn test_regeneration_tears_down_before_adding() {
        let mut scene = MockScene::default();
        let mut driver = GalaxyDriver::new(small_params(), 1.0);
        let mut rng = RngSource::seeded(2);
        driver.regenerate(&mut scene, &mut rng).unwrap();
        driver.params_mut().total_points = 200;
        driver.regenerate(&mut scene, &mut rng).unwrap();

        assert_eq!(
            scene.calls[2..],
            [
                Call::Remove(0),
                Call::Dispose(0),
                Call::Create(1, 200),
                Call::Add(1)
            ]
        );
        assert_eq!(scene.live, vec![1]);
        assert_eq!(scene.visible, vec![1]);
        assert_eq!(driver.point_count(), 200);
        assert_eq!(driver.generation(), 2);
    }

    #[test]
    fn test_failed_regeneration_keeps_old_galaxy() {
        let mut scene = MockScene::default();
        let mut driver = GalaxyDriver::new(small_params(), 1.0);
        let mut rng = RngSource::seeded(3);
        driver.regenerate(&mut scene, &mut rng).unwrap();
        let calls_before = scene.calls.len();

        driver.params_mut().radius = 0.0;
        let err = driver.regenerate(&mut scene, &mut rng).unwrap_err();

        assert!(matches!(
            err,
            GenerateError::InvalidParameter { field: "radius", .. }
        ));
        assert_eq!(scene.calls.len(), calls_before);
        assert_eq!(scene.visible, vec![0]);
        assert_eq!(driver.state(), DriverState::Active);
        assert_eq!(driver.point_count(), 500);
        assert_eq!(driver.generation(), 1);
    }

    #[test]
    fn test_failed_first_generation_stays_idle() {
        let mut scene = MockScene::default();
        let mut driver = GalaxyDriver::new(
            ParameterSet {
                total_points: 0,
                ..Default::default()
            },
            1.0,
        );
        assert!(driver.regenerate(&mut scene, &mut RngSource::seeded(4)).is_err());
        assert_eq!(driver.state(), DriverState::Idle);
        assert!(scene.calls.is_empty());
    }

    #[test]
    fn test_tick_scales_elapsed_by_speed() {
        let mut scene = MockScene::default();
        let mut driver = GalaxyDriver::new(small_params(), 1.0);
        driver.regenerate(&mut scene, &mut RngSource::seeded(5)).unwrap();

        assert_eq!(driver.tick(&mut scene, 4.0), Some(2.0));
        driver.params_mut().animation_speed = 3.0;
        assert_eq!(driver.tick(&mut scene, 4.0), Some(12.0));
        assert_eq!(scene.calls.last(), Some(&Call::SetTime(0, 12.0)));
    }

    #[test]
    fn test_speed_change_does_not_regenerate() {
        let mut scene = MockScene::default();
        let mut driver = GalaxyDriver::new(small_params(), 1.0);
        driver.regenerate(&mut scene, &mut RngSource::seeded(6)).unwrap();
        driver.params_mut().animation_speed = 0.0;
        assert_eq!(driver.tick(&mut scene, 10.0), Some(0.0));
        assert_eq!(driver.generation(), 1);
    }

    #[test]
    fn test_pixel_ratio_applies_on_next_generation() {
        let mut scene = MockScene::default();
        let mut driver = GalaxyDriver::new(small_params(), 1.0);
        let mut rng = RngSource::seeded(7);
        driver.regenerate(&mut scene, &mut rng).unwrap();
        assert_eq!(scene.last_shading.unwrap().point_size_scale, 20.0);

        driver.set_pixel_ratio(2.0);
        assert_eq!(scene.last_shading.unwrap().point_size_scale, 20.0);
        driver.regenerate(&mut scene, &mut rng).unwrap();
        assert_eq!(scene.last_shading.unwrap().point_size_scale, 40.0);
        assert_eq!(scene.last_shading.unwrap().brightness, 2.0);
    }

    #[test]
    fn test_set_params_replaces_all_fields() {
        let mut driver: GalaxyDriver<MockScene> = GalaxyDriver::new(small_params(), 1.0);
        driver.set_params(ParameterSet::default());
        assert_eq!(driver.params().total_points, 40_000);
    }
}
