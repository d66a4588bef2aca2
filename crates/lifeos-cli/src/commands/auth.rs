use clap::Subcommand;
use lifeos_core::{Config, TodoistSink};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store a Todoist API token after checking it
    Todoist {
        /// Personal API token from Todoist settings
        token: String,
    },
    /// Remove the stored Todoist token
    Logout,
    /// Check authentication status
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let base_url = &config.todoist.base_url;

    match action {
        AuthAction::Todoist { token } => {
            let mut sink = TodoistSink::with_token(base_url, &token)?;
            sink.verify()?;
            sink.set_credentials(&token)?;
            println!("Todoist authenticated");
        }
        AuthAction::Logout => {
            let mut sink = TodoistSink::new(base_url)?;
            sink.disconnect()?;
            println!("Todoist disconnected");
        }
        AuthAction::Status => {
            let sink = TodoistSink::new(base_url)?;
            println!(
                "todoist: {}",
                if sink.is_authenticated() {
                    "authenticated"
                } else {
                    "not authenticated"
                }
            );
        }
    }
    Ok(())
}
