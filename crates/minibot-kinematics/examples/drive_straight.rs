use minibot_kinematics::*;

fn main() {
    let agent_width = DEFAULT_AGENT_WIDTH;
    let max_action_distance = DEFAULT_MAX_ACTION_DISTANCE;
    let kinematics_result = DifferentialDrive::new(agent_width, max_action_distance);

    let mut current_pose = Pose::new(0.0, 0.0, 0.0);
    let plan = [
        (MotorCommand::new(1.0, 1.0), 5),  // one tile north
        (MotorCommand::new(1.0, -1.0), 3), // quarter turn clockwise
        (MotorCommand::new(1.0, 1.0), 5),  // one tile east
        (MotorCommand::new(0.5, 1.0), 4),  // gentle left arc
    ];

    match kinematics_result {
        Ok(kinematics) => {
            println!("Initializing simulation...");
            println!("  {}", kinematics);
            println!("  Initial Pose: {}", current_pose);
            println!("\nSimulating...");

            let mut step = 0;
            for (command, repeat) in plan {
                for _ in 0..repeat {
                    step += 1;
                    current_pose = kinematics.propose(current_pose, command);
                    println!("Step {:>2}: {} -> Pose: {}", step, command, current_pose);
                }
            }

            println!("\nSimulation complete.");
            println!("Final Pose: {:?}", current_pose);
        }
        Err(e) => {
            eprintln!("Failed to initialize kinematics: {}", e);
        }
    }
}
