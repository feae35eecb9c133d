use super::Viewport;

/// Maps a pointer position (logical px) to the light position uniform.
///
/// `x` spans `[-0.5, 0.5)` left to right, `y` spans `(-0.5, 0.5]` bottom to
/// top, so the centre of the viewport is `(0, 0)`. An invalid viewport maps
/// every pointer to `(0, 0)`.
pub fn pointer_to_light(pointer: (f32, f32), viewport: Viewport) -> [f32; 2] {
    if !viewport.is_valid() {
        return [0.0, 0.0];
    }
    let (x, y) = pointer;
    [-0.5 + x / viewport.width, 0.5 - y / viewport.height]
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport::new(800.0, 600.0);

    fn approx(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-6 && (a[1] - b[1]).abs() < 1e-6
    }

    #[test]
    fn center_maps_to_origin() {
        assert!(approx(pointer_to_light(VP.center(), VP), [0.0, 0.0]));
    }

    #[test]
    fn top_left_corner() {
        assert!(approx(pointer_to_light((0.0, 0.0), VP), [-0.5, 0.5]));
    }

    #[test]
    fn bottom_right_corner() {
        assert!(approx(pointer_to_light((800.0, 600.0), VP), [0.5, -0.5]));
    }

    #[test]
    fn y_grows_upwards() {
        let high = pointer_to_light((400.0, 100.0), VP);
        let low = pointer_to_light((400.0, 500.0), VP);
        assert!(high[1] > low[1]);
    }

    #[test]
    fn degenerate_viewport_maps_to_origin() {
        assert_eq!(pointer_to_light((10.0, 10.0), Viewport::new(0.0, 600.0)), [0.0, 0.0]);
        assert_eq!(pointer_to_light((10.0, 10.0), Viewport::new(f32::NAN, 1.0)), [0.0, 0.0]);
    }
}
