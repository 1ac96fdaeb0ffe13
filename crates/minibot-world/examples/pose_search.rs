use std::sync::Arc;

use minibot_world::{MapSet, MotorCommand, SimSession, SimulatorConfig, WorldError};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> Result<(), WorldError> {
    let maps = Arc::new(MapSet::builtin()?);
    let config = SimulatorConfig::default();
    let mut rng = StdRng::seed_from_u64(2024);

    let mut driver = SimSession::new(Arc::clone(&maps), &config)?;
    driver.reset_on_map(2)?;
    for command in [MotorCommand::new(1.0, 1.0), MotorCommand::new(1.0, -1.0)] {
        driver.step(command);
    }
    let observation = driver.observation();
    println!("Observation on map 2 at {}:\n{}", driver.pose(), observation);

    let mut restored = SimSession::new(maps, &config)?;
    restored.reset_to_state(&observation, &mut rng)?;
    println!(
        "Matched on map {} at {}:\n{}",
        restored.map_index(),
        restored.pose(),
        restored.observation()
    );
    Ok(())
}
