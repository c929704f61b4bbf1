use crate::math::{Transform, Vector3};

/// Drawing backend for [`Simulation::render`](crate::sim::Simulation::render).
///
/// The simulation walks its geoms and issues one call per primitive;
/// the backend decides how (or whether) to draw them.
pub trait Renderer {
    /// Positions the camera, looking from `eye` toward `target`
    fn set_viewpoint(&mut self, eye: Vector3, target: Vector3);

    /// Draws a box with the given full side lengths
    fn draw_box(&mut self, pose: &Transform, sides: Vector3);

    /// Draws a sphere
    fn draw_sphere(&mut self, pose: &Transform, radius: f32);

    /// Draws a single world-space triangle
    fn draw_triangle(&mut self, a: Vector3, b: Vector3, c: Vector3);
}
