use anyhow::Result;
use ticktasks_core::TickTasksError;

use super::open;

pub async fn run(title: Vec<String>, description: String) -> Result<()> {
    let title = title.join(" ");
    let (_, service) = open().await?;

    match service.add(&title, &description).await {
        Ok(task) => {
            println!("\u{2713} Added: {}", task.title);
            println!("  ID: {}", task.id);
            Ok(())
        }
        Err(TickTasksError::InvalidInput(message)) => {
            eprintln!("{}", message);
            anyhow::bail!("Task was not added");
        }
        Err(e) => Err(e.into()),
    }
}
