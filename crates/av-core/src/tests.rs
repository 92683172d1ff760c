//! Unit tests for av-core.

mod space {
    use crate::{Cell, Heading, Vec2};

    #[test]
    fn manhattan_distance() {
        assert_eq!(Cell::new(0, 0).manhattan(Cell::new(11, 19)), 30);
        assert_eq!(Cell::new(3, 4).manhattan(Cell::new(3, 4)), 0);
        // Symmetric across negative deltas.
        assert_eq!(Cell::new(5, 5).manhattan(Cell::new(2, 9)), 7);
        assert_eq!(Cell::new(2, 9).manhattan(Cell::new(5, 5)), 7);
    }

    #[test]
    fn neighbor_order_is_up_down_left_right() {
        let c = Cell::new(4, 7);
        let n = c.neighbors4();
        assert_eq!(n[0], Cell::new(3, 7));
        assert_eq!(n[1], Cell::new(5, 7));
        assert_eq!(n[2], Cell::new(4, 6));
        assert_eq!(n[3], Cell::new(4, 8));
        for nb in n {
            assert!(c.is_adjacent4(nb));
        }
        assert!(!c.is_adjacent4(Cell::new(3, 6))); // diagonal
        assert!(!c.is_adjacent4(c));
    }

    #[test]
    fn cell_center_and_back() {
        let c = Cell::new(2, 5);
        let center = c.center();
        assert_eq!(center, Vec2::new(5.5, 2.5));
        assert_eq!(center.cell(), c);
    }

    #[test]
    fn step_toward_does_not_overshoot() {
        let from = Vec2::new(0.5, 0.5);
        let target = Vec2::new(1.5, 0.5);
        let mid = from.step_toward(target, 0.4);
        assert!((mid.x - 0.9).abs() < 1e-6);
        // A step larger than the remaining distance snaps to the target.
        let there = mid.step_toward(target, 10.0);
        assert_eq!(there, target);
        // Stepping from the target stays put.
        assert_eq!(target.step_toward(target, 0.4), target);
    }

    #[test]
    fn heading_between_cardinal_steps() {
        let c = Cell::new(3, 3);
        assert_eq!(Heading::between(c, Cell::new(2, 3)), Some(Heading::North));
        assert_eq!(Heading::between(c, Cell::new(4, 3)), Some(Heading::South));
        assert_eq!(Heading::between(c, Cell::new(3, 2)), Some(Heading::West));
        assert_eq!(Heading::between(c, Cell::new(3, 4)), Some(Heading::East));
        assert_eq!(Heading::between(c, c), None);
        assert_eq!(Heading::between(c, Cell::new(2, 2)), None); // diagonal
    }

    #[test]
    fn heading_degrees_clockwise_from_up() {
        assert_eq!(Heading::North.degrees(), 0.0);
        assert_eq!(Heading::East.degrees(), 90.0);
        assert_eq!(Heading::South.degrees(), 180.0);
        assert_eq!(Heading::West.degrees(), 270.0);
    }
}

mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn clock_elapsed_secs() {
        let mut clock = SimClock::new(0.1);
        assert_eq!(clock.elapsed_secs(), 0.0);
        for _ in 0..30 {
            clock.advance();
        }
        assert!((clock.elapsed_secs() - 3.0).abs() < 1e-4);
        assert_eq!(clock.current_tick, Tick(30));
    }

    #[test]
    fn ticks_for_secs_rounds_up() {
        let clock = SimClock::new(0.1);
        assert_eq!(clock.ticks_for_secs(1.0), 10);
        assert_eq!(clock.ticks_for_secs(0.05), 1);
        assert_eq!(clock.ticks_for_secs(1.51), 16);
    }

    #[test]
    fn config_end_tick() {
        let config = SimConfig {
            total_ticks: 42,
            ..SimConfig::default()
        };
        assert_eq!(config.end_tick(), Tick(42));
        let clock = config.make_clock();
        assert_eq!(clock.current_tick, Tick::ZERO);
    }
}

mod rng {
    use crate::{AgentId, AgentRng, SimRng};

    #[test]
    fn agent_rng_deterministic_per_seed() {
        let mut a1 = AgentRng::new(7, AgentId(3));
        let mut a2 = AgentRng::new(7, AgentId(3));
        for _ in 0..16 {
            assert_eq!(a1.gen_range(0u32..1000), a2.gen_range(0u32..1000));
        }
    }

    #[test]
    fn agent_rng_streams_independent() {
        let mut a = AgentRng::new(7, AgentId(0));
        let mut b = AgentRng::new(7, AgentId(1));
        let seq_a: Vec<u32> = (0..8).map(|_| a.gen_range(0..u32::MAX)).collect();
        let seq_b: Vec<u32> = (0..8).map(|_| b.gen_range(0..u32::MAX)).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn sim_rng_child_diverges_from_parent() {
        let mut parent = SimRng::new(99);
        let mut child = parent.child(1);
        let a: u64 = parent.gen_range(0..u64::MAX);
        let b: u64 = child.gen_range(0..u64::MAX);
        assert_ne!(a, b);
    }

    #[test]
    fn choose_empty_slice_is_none() {
        let mut rng = SimRng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}

mod ids {
    use crate::AgentId;

    #[test]
    fn invalid_sentinel_is_default() {
        assert_eq!(AgentId::default(), AgentId::INVALID);
        assert_eq!(AgentId(5).index(), 5);
    }
}
