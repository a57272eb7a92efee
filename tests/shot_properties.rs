use glam::Vec2;
use proptest::prelude::*;

use mini_golf::Tuning;
use mini_golf::sim::{Release, ShotController};

fn release(drag: Vec2) -> Release {
    let mut shot = ShotController::new(&Tuning::default());
    shot.pointer_down(Vec2::ZERO);
    shot.pointer_move(drag);
    shot.pointer_up()
}

fn power_for(length: f32) -> f32 {
    let mut shot = ShotController::new(&Tuning::default());
    shot.pointer_down(Vec2::ZERO);
    shot.pointer_move(Vec2::new(0.0, length));
    shot.update_charge();
    shot.charge_power()
}

proptest! {
    #[test]
    fn power_grows_with_drag_and_caps(a in 0.0f32..400.0, b in 0.0f32..400.0) {
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        let (p_short, p_long) = (power_for(short), power_for(long));
        prop_assert!(p_short <= p_long);
        prop_assert!((0.0..=100.0).contains(&p_long));
    }

    #[test]
    fn release_aims_opposite_drag(x in -200.0f32..200.0, y in -200.0f32..200.0) {
        let drag = Vec2::new(x, y);
        match release(drag) {
            Release::Shot(shot) => {
                prop_assert!((shot.aim.length() - 1.0).abs() < 1e-4);
                prop_assert_eq!(shot.aim.y, 0.0);
                let back = Vec2::new(-shot.aim.x, -shot.aim.z);
                prop_assert!(back.dot(drag.normalize()) > 0.999);
                prop_assert!(shot.power >= 5.0 && shot.power <= 100.0);
            }
            Release::Cancelled => prop_assert!(drag.length() / 80.0 * 100.0 < 5.0),
            Release::Ignored => prop_assert!(false, "drag was in progress"),
        }
    }
}
