//! Worked example binary: loads the engine config, wires voice selection
//! (C4) through the council (C6) into the durable memory store (C2), and
//! prints the synthesized result. Not a product surface — see
//! `SPEC_FULL.md` §2 for why this stays a thin demo rather than a CLI tool.

use anyhow::Result;
use brain_api::logging::{init_tracing, LoggingConfig};
use brain_cognitive::voices::{default_voices, EchoBackend, VoiceRegistry};
use brain_cognitive::Council;
use brain_core::selection::TaskContext;
use brain_infra::memory_store::MemoryStore;
use brain_types::domain::Learning;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "brain", version, about = "Voice collaboration engine demo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one council round over a prompt and print the synthesized answer.
    Deliberate {
        /// The task prompt to deliberate on.
        prompt: String,
        /// Selection category hint (e.g. "security", "architecture").
        #[arg(short, long, default_value = "implementation")]
        category: String,
        /// Record the outcome as a learning in the memory store.
        #[arg(long)]
        record: bool,
    },
    /// Print the recorded learnings for a session.
    History {
        session_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&LoggingConfig::default())?;

    let cli = Cli::parse();
    let config = brain_infra::config::load_config_from_env()?;
    let memory = MemoryStore::connect(config.memory.clone()).await?;

    let registry = VoiceRegistry::new();
    for voice in default_voices() {
        registry.register(voice)?;
    }
    let council = Council::new(Arc::new(registry), Arc::new(EchoBackend), config.selector.clone(), config.synthesis.clone());

    match cli.command {
        Commands::Deliberate { prompt, category, record } => {
            let ctx = TaskContext {
                prompt: prompt.clone(),
                category,
                estimated_tokens: prompt.split_whitespace().count() as u32 * 2,
                user_preference: None,
                time_constraint: Some(Duration::from_secs(30)),
            };

            let started = std::time::Instant::now();
            let (selection, synthesis) = council.deliberate(&ctx).await?;

            println!("voices selected: {:?} ({})", selection.voices, selection.reasoning);
            println!("synthesis strategy: {:?}", synthesis.strategy);
            println!("confidence: {:.1}", synthesis.confidence);
            println!("---");
            println!("{}", synthesis.combined_content);

            if record {
                let session_id = uuid::Uuid::new_v4().to_string();
                let learning = Learning {
                    id: uuid::Uuid::new_v4(),
                    session_id: session_id.clone(),
                    user_input: prompt,
                    intent: ctx.category.clone(),
                    tasks_completed: selection.voices.clone(),
                    success: synthesis.success,
                    duration: started.elapsed(),
                    learnings: vec![synthesis.combined_content.clone()],
                    suggestions: vec![],
                    project_path: None,
                    confidence: synthesis.confidence,
                    created_at: chrono::Utc::now(),
                    metadata: HashMap::new(),
                };
                memory.record_learning(&learning).await?;
                println!("---");
                println!("recorded as session {session_id}");
            }
        }
        Commands::History { session_id } => {
            let learnings = memory.get_learnings_by_session(&session_id).await?;
            if learnings.is_empty() {
                println!("no learnings recorded for session {session_id}");
            }
            for learning in learnings {
                println!("[{}] {} -> {:?}", learning.created_at, learning.user_input, learning.learnings);
            }
        }
    }

    Ok(())
}
