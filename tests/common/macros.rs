/// Asserts that no pool holds more active slots than its capacity.
#[macro_export]
macro_rules! assert_within_capacity {
    ($world:expr) => {
        assert!(
            $world.cells.len() <= $world.cells.capacity(),
            "cell pool {} over capacity {}",
            $world.cells.len(),
            $world.cells.capacity()
        );
        assert!(
            $world.plants.len() <= $world.plants.capacity(),
            "plant pool {} over capacity {}",
            $world.plants.len(),
            $world.plants.capacity()
        );
    };
}

/// Asserts that every live entity sits inside the world border.
#[macro_export]
macro_rules! assert_inside_border {
    ($world:expr) => {
        for c in $world.cells.iter().filter(|c| c.life.alive) {
            let p = c.kinematics.position;
            assert!(
                $world.border.contains(p),
                "cell {} at {:?} outside border {:?}",
                c.slot,
                p,
                $world.border
            );
        }
        for pl in $world.plants.iter().filter(|p| p.life.alive) {
            let p = pl.kinematics.position;
            assert!(
                $world.border.contains(p),
                "plant {} at {:?} outside border {:?}",
                pl.slot,
                p,
                $world.border
            );
        }
    };
}

/// Asserts the pool slot at `$slot` is inactive.
#[macro_export]
macro_rules! assert_retired {
    ($pool:expr, $slot:expr) => {
        assert!(
            !$pool.is_active($slot),
            "slot {} should be retired but is still active",
            $slot
        );
    };
}
