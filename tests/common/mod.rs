use gridworld_mdp::*;

/// 5x5 world with the target at (2, 3) and six forbidden cells.
#[allow(dead_code)]
pub fn five_by_five() -> GridWorldConfig {
    GridWorldConfig::new(5, 5)
        .target_state((2, 3))
        .forbidden_states([(1, 1), (2, 1), (2, 2), (1, 3), (3, 3), (1, 4)])
}

#[allow(dead_code)]
pub fn quiet_env(config: GridWorldConfig) -> GridWorld<NoNoise> {
    GridWorld::with_noise(config, NoNoise).unwrap()
}

/// Steps through `actions`, returning every step's outcome.
#[allow(dead_code)]
pub fn walk<N: NoiseSource>(env: &mut GridWorld<N>, actions: &[Action]) -> Vec<StepInfo> {
    actions
        .iter()
        .map(|a| env.step(a).unwrap())
        .collect()
}

#[allow(dead_code)]
pub fn index(env: &GridWorld<NoNoise>, x: i32, y: i32) -> Discrete {
    env.index_of(Coord::new(x, y)).unwrap()
}
