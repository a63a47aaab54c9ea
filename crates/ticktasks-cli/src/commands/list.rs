use anyhow::Result;

use super::{format_task_line, open};

pub async fn run(json: bool) -> Result<()> {
    let (_, service) = open().await?;
    let tasks = service.tasks().current();

    if json {
        println!("{}", serde_json::to_string_pretty(&*tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks yet. Add one with `ticktasks add <title>`.");
        return Ok(());
    }

    for task in tasks.iter() {
        println!("{}", format_task_line(task));
    }

    let done = tasks.iter().filter(|t| t.checked).count();
    println!();
    println!("{} task(s), {} checked", tasks.len(), done);
    Ok(())
}
