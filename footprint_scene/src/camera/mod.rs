mod fit;
mod orbit;

pub use fit::{
    advance_camera_fit, animate_fit, apply_fit, cancel_fit, compute_fit, ease_out_cubic,
    fit_camera, vertical_fov, CameraFitAnimation, FitCamera, FitError, FitTarget, VIEW_DIRECTION,
};
pub use orbit::{orbit_camera_plugin, OrbitControl};
