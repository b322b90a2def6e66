//! Per-tick driver intents supplied by an input provider

/// Raw per-tick intents. `restart_pressed` is an edge, the rest are held states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverInput {
    pub steer_left: bool,
    pub steer_right: bool,
    pub throttle_forward: bool,
    pub throttle_back: bool,
    pub restart_pressed: bool,
}

/// Steering intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    None,
    Right,
}

impl Steer {
    /// -1, 0 or +1. Positive turns clockwise on screen (y grows downward).
    pub fn sign(&self) -> f32 {
        match self {
            Steer::Left => -1.0,
            Steer::None => 0.0,
            Steer::Right => 1.0,
        }
    }
}

/// Throttle intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    Reverse,
    None,
    Forward,
}

impl DriverInput {
    /// Opposing keys cancel out
    pub fn steer(&self) -> Steer {
        match (self.steer_left, self.steer_right) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            _ => Steer::None,
        }
    }

    /// Forward wins when both throttle keys are held
    pub fn throttle(&self) -> Throttle {
        if self.throttle_forward {
            Throttle::Forward
        } else if self.throttle_back {
            Throttle::Reverse
        } else {
            Throttle::None
        }
    }

    pub fn forward() -> Self {
        Self {
            throttle_forward: true,
            ..Default::default()
        }
    }

    pub fn restart() -> Self {
        Self {
            restart_pressed: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposing_steer_cancels() {
        let input = DriverInput {
            steer_left: true,
            steer_right: true,
            ..Default::default()
        };
        assert_eq!(input.steer(), Steer::None);
        assert_eq!(input.steer().sign(), 0.0);
    }

    #[test]
    fn test_throttle_priority() {
        let both = DriverInput {
            throttle_forward: true,
            throttle_back: true,
            ..Default::default()
        };
        assert_eq!(both.throttle(), Throttle::Forward);
        assert_eq!(DriverInput::default().throttle(), Throttle::None);
        let back = DriverInput {
            throttle_back: true,
            ..Default::default()
        };
        assert_eq!(back.throttle(), Throttle::Reverse);
    }
}
