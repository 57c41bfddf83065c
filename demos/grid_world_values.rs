extern crate gridworld_mdp;
extern crate serde_json;

use gridworld_mdp::*;
use rand::prelude::*;
use std::rc::Rc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = GridWorldConfig::new(5, 5)
        .start_state((0, 0))
        .target_state((2, 3))
        .forbidden_states([(1, 1), (2, 1), (2, 2), (1, 3), (3, 3), (1, 4)])
        .rewards(1., -1., 0.);

    let model = GridWorld::with_noise(config.clone(), NoNoise)?;
    let vi = &mut ValueIteration::new(Rc::new(model));
    let (delta, sweeps) = vi.exec(1e-6, None)?;
    println!("value iteration: {sweeps} sweeps, last delta {delta:e}");

    let values = vi.values();
    let policy = vi.policy()?;
    for row in values.as_slice().unwrap_or_default().chunks(config.env_size.0) {
        let cells = row.iter().map(|v| format!("{v:6.2}")).collect::<Vec<_>>();
        println!("{}", cells.join(" "));
    }

    let env = &mut GridWorld::new(config, Some(2718))?;
    let episode = rollout(env, &policy, &mut StdRng::seed_from_u64(2718), 100)?;
    println!(
        "greedy episode: {} steps, return {:.3}",
        episode.actions.len(),
        episode.discounted_return(env.gamma())
    );

    let snapshot = env.snapshot(Some(&policy), values.as_slice())?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
