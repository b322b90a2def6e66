use crate::game::constants::kinetics::*;
use crate::game::input::{Steer, Throttle};
use crate::game::state::Vehicle;
use crate::util::vec2::Vec2;

/// Tuning for the signed-speed-along-heading model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticsTuning {
    pub turn_rate_per_ms: f32,
    pub forward_accel_per_ms: f32,
    pub brake_decel_per_ms: f32,
    pub reverse_accel_per_ms: f32,
    pub accel_gain: f32,
    pub reverse_gain: f32,
    /// Coast multiplier applied once per tick regardless of delta time
    pub friction_per_tick: f32,
    pub max_forward_speed: f32,
    pub max_reverse_speed: f32,
}

impl Default for KineticsTuning {
    fn default() -> Self {
        Self {
            turn_rate_per_ms: TURN_RATE_PER_MS,
            forward_accel_per_ms: FORWARD_ACCEL_PER_MS,
            brake_decel_per_ms: BRAKE_DECEL_PER_MS,
            reverse_accel_per_ms: REVERSE_ACCEL_PER_MS,
            accel_gain: ACCEL_GAIN,
            reverse_gain: REVERSE_GAIN,
            friction_per_tick: FRICTION_PER_TICK,
            max_forward_speed: MAX_FORWARD_SPEED,
            max_reverse_speed: MAX_REVERSE_SPEED,
        }
    }
}

/// Speed along `heading`: magnitude of `velocity`, negative when the car
/// moves against the way it points. Zero velocity counts as forward.
pub fn signed_speed(velocity: Vec2, heading: Vec2) -> f32 {
    let magnitude = velocity.length();
    if velocity.dot(heading) < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Advance the scalar speed one tick for the given throttle intent
pub fn next_speed(speed: f32, throttle: Throttle, delta_ms: f32, tuning: &KineticsTuning) -> f32 {
    let speed = match throttle {
        Throttle::Forward => speed + tuning.forward_accel_per_ms * delta_ms * tuning.accel_gain,
        Throttle::Reverse if speed > 0.0 => {
            speed - tuning.brake_decel_per_ms * delta_ms * tuning.accel_gain
        }
        Throttle::Reverse => speed - tuning.reverse_accel_per_ms * delta_ms * tuning.reverse_gain,
        Throttle::None => speed * tuning.friction_per_tick,
    };
    speed.clamp(-tuning.max_reverse_speed, tuning.max_forward_speed)
}

/// Steer, then rebuild velocity along the new heading from the updated
/// signed speed. Returns the new signed speed.
pub fn update(
    vehicle: &mut Vehicle,
    steer: Steer,
    throttle: Throttle,
    delta_ms: f32,
    tuning: &KineticsTuning,
) -> f32 {
    let delta_ms = delta_ms.max(0.0);

    vehicle.heading += steer.sign() * tuning.turn_rate_per_ms * delta_ms;
    let heading = vehicle.heading_vector();

    let speed = next_speed(signed_speed(vehicle.velocity, heading), throttle, delta_ms, tuning);
    vehicle.velocity = heading * speed;
    speed
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 16.0;

    fn vehicle() -> Vehicle {
        Vehicle::new(Vec2::new(100.0, 100.0), 0.0, 0)
    }

    #[test]
    fn test_signed_speed_sign() {
        let heading = Vec2::new(1.0, 0.0);
        assert_eq!(signed_speed(Vec2::new(30.0, 40.0), heading), 50.0);
        assert_eq!(signed_speed(Vec2::new(-30.0, 40.0), heading), -50.0);
        // Zero velocity is forward
        assert_eq!(signed_speed(Vec2::ZERO, heading), 0.0);
        assert!(signed_speed(Vec2::ZERO, heading).is_sign_positive());
    }

    #[test]
    fn test_forward_throttle_accelerates_along_heading() {
        let tuning = KineticsTuning::default();
        let mut car = vehicle();

        let speed = update(&mut car, Steer::None, Throttle::Forward, DT, &tuning);

        let expected = FORWARD_ACCEL_PER_MS * DT * ACCEL_GAIN;
        assert!((speed - expected).abs() < 1e-4);
        assert!((car.velocity.x - expected).abs() < 1e-4);
        assert!(car.velocity.y.abs() < 1e-4);
    }

    #[test]
    fn test_reverse_brakes_before_backing_up() {
        let tuning = KineticsTuning::default();
        let braked = next_speed(100.0, Throttle::Reverse, DT, &tuning);
        assert!((braked - (100.0 - BRAKE_DECEL_PER_MS * DT * ACCEL_GAIN)).abs() < 1e-4);

        let backing = next_speed(0.0, Throttle::Reverse, DT, &tuning);
        assert!((backing + REVERSE_ACCEL_PER_MS * DT * REVERSE_GAIN).abs() < 1e-4);
    }

    #[test]
    fn test_coast_friction_ignores_delta() {
        let tuning = KineticsTuning::default();
        let short = next_speed(100.0, Throttle::None, 1.0, &tuning);
        let long = next_speed(100.0, Throttle::None, 100.0, &tuning);
        assert_eq!(short, long);
        assert!((short - 100.0 * FRICTION_PER_TICK).abs() < 1e-4);
    }

    #[test]
    fn test_coast_decays_monotonically_without_sign_change() {
        let tuning = KineticsTuning::default();
        for start in [200.0_f32, -90.0] {
            let mut speed = start;
            for delta in [0.0, 1.0, 16.0, 33.0, 100.0].iter().cycle().take(400) {
                let next = next_speed(speed, Throttle::None, *delta, &tuning);
                assert!(next.abs() <= speed.abs());
                assert_eq!(next.is_sign_negative(), speed.is_sign_negative());
                speed = next;
            }
            assert!(speed.abs() < 1.0);
        }
    }

    #[test]
    fn test_speed_always_clamped() {
        let tuning = KineticsTuning::default();
        let mut car = vehicle();
        for _ in 0..500 {
            let speed = update(&mut car, Steer::Right, Throttle::Forward, 50.0, &tuning);
            assert!(speed <= MAX_FORWARD_SPEED && speed >= -MAX_REVERSE_SPEED);
        }
        assert!((car.speed() - MAX_FORWARD_SPEED).abs() < 1e-3);

        for _ in 0..500 {
            let speed = update(&mut car, Steer::Left, Throttle::Reverse, 50.0, &tuning);
            assert!(speed <= MAX_FORWARD_SPEED && speed >= -MAX_REVERSE_SPEED);
        }
        assert!((car.speed() - MAX_REVERSE_SPEED).abs() < 1e-3);
    }

    #[test]
    fn test_steering_turns_heading() {
        let tuning = KineticsTuning::default();
        let mut car = vehicle();
        update(&mut car, Steer::Right, Throttle::None, DT, &tuning);
        assert!((car.heading - TURN_RATE_PER_MS * DT).abs() < 1e-6);
        update(&mut car, Steer::Left, Throttle::None, DT, &tuning);
        assert!(car.heading.abs() < 1e-6);
    }

    #[test]
    fn test_sliding_backwards_keeps_reverse_sign() {
        let tuning = KineticsTuning::default();
        let mut car = vehicle();
        car.velocity = Vec2::new(-50.0, 0.0);

        let speed = update(&mut car, Steer::None, Throttle::None, DT, &tuning);

        assert!(speed < 0.0);
        assert!(car.velocity.x < 0.0);
    }
}
