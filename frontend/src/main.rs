use std::io::{self, BufRead};

mod session;

use session::{print_valid_commands, Flow, Session};

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    println!("Welcome to the obstacle avoidance route planner.\n");
    print_valid_commands();

    let mut session = Session::new();
    let stdin = io::stdin();

    loop {
        println!("Enter Command:");
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // stdin closed
            break;
        }
        if session.dispatch(line.trim()) == Flow::Exit {
            break;
        }
    }

    Ok(())
}
