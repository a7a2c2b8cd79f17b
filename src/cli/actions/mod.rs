pub mod bootstrap;
pub mod server;

// The match over actions lives in run.rs.
mod run;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    Bootstrap(bootstrap::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
