use std::sync::Arc;

use telcoprefix::{CarrierDetector, InputPipeline, PipelineConfig, PipelineState};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Each stdin line replaces the whole input field, as if typed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let detector = Arc::new(CarrierDetector::new()?);
    let mut pipeline = InputPipeline::new(detector, PipelineConfig::default())?;
    let mut rx = pipeline.subscribe();

    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match state {
                PipelineState::Idle => println!("idle"),
                PipelineState::Loading => println!("loading..."),
                PipelineState::Resolved(verdict) => match serde_json::to_string(&verdict) {
                    Ok(json) => println!("{json}"),
                    Err(err) => eprintln!("cannot encode verdict: {err}"),
                },
                PipelineState::Error(message) => println!("error: {message}"),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        // Rejections are already published as an error state.
        let _ = pipeline.edit(&line);
    }

    tokio::time::sleep(pipeline.config().debounce * 2).await;
    pipeline.shutdown();
    Ok(())
}
