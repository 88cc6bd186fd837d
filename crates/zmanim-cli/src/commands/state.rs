use std::path::Path;
use zmanim_core::{FileStateStore, ZmanLabel};

use super::{load_config, runtime};

fn store(config_path: Option<&Path>) -> Result<FileStateStore, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    Ok(FileStateStore::new(config.state_dir()?))
}

pub fn run_state(config_path: Option<&Path>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = store(config_path)?;
    let (current, hour) = runtime()?.block_on(async {
        Ok::<_, zmanim_core::CoreError>((store.read_current().await?, store.read_hour().await?))
    })?;

    if json {
        let out = serde_json::json!({ "current": current, "hour": hour });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match current {
        Some(current) => {
            println!("{}", current.display);
            if let Some(anchor) = current.anchor {
                println!("Anchor: {}", anchor.display_name());
            }
            println!("Computed: {}", current.computed_at.format("%Y-%m-%d %-I:%M %p"));
        }
        None => println!("No state written yet in {}", store.dir().display()),
    }
    if let Some(hour) = hour {
        println!(
            "Halachic hour {} ({:.1} min hours)",
            hour.hour, hour.hour_length_minutes
        );
    }
    Ok(())
}

pub fn run_read(
    config_path: Option<&Path>,
    label: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let label: ZmanLabel = label.parse()?;
    let store = store(config_path)?;
    let record = runtime()?.block_on(store.read_label(label))?;

    match record {
        Some(record) if json => println!("{}", serde_json::to_string_pretty(&record)?),
        Some(record) => {
            let relevance = if record.relevant { "relevant" } else { "not relevant" };
            println!("{} ({relevance})", record.display);
        }
        None => return Err(format!("no record for '{label}' in {}", store.dir().display()).into()),
    }
    Ok(())
}
