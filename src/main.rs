use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gemini_prompt_client::models::HarmBlockThreshold;
use gemini_prompt_client::{
    extract_binary, Config, ContentPart, GenAiClient, GenerationConfig, Modality, RequestBuilder,
    SafetySetting,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-prompt")]
#[command(about = "Send prompts, files and chats to Gemini")]
struct CliArgs {
    /// Model ID, overriding GEMINI_MODEL.
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a response for a single prompt.
    Prompt {
        prompt: String,
        /// System instruction steering the model.
        #[arg(long)]
        system: Option<String>,
        /// Ask for raw JSON output.
        #[arg(long)]
        json: bool,
        /// JSON schema file constraining the output (implies --json).
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,
        #[arg(long, value_parser = parse_temperature)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Block medium-and-above harm in every category.
        #[arg(long)]
        strict_safety: bool,
    },
    /// Ask about an image or document.
    Describe {
        path: PathBuf,
        #[arg(long, default_value = "Describe what you see in this image")]
        prompt: String,
        /// Send the file inline instead of uploading it first.
        #[arg(long)]
        inline: bool,
    },
    /// Generate an image and save it.
    Image {
        prompt: String,
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
    },
    /// Interactive chat; type `quit` to leave.
    Chat,
}

fn parse_temperature(input: &str) -> std::result::Result<f32, String> {
    let value: f32 = input
        .parse()
        .map_err(|_| format!("Invalid temperature '{}'. Expected a number", input))?;
    if !(0.0..=2.0).contains(&value) {
        return Err(format!(
            "Invalid temperature '{}'. Expected a value between 0 and 2",
            input
        ));
    }
    Ok(value)
}

async fn run(client: &GenAiClient, command: Command) -> Result<()> {
    match command {
        Command::Prompt {
            prompt,
            system,
            json,
            schema,
            temperature,
            max_tokens,
            strict_safety,
        } => {
            let mut config = match schema {
                Some(path) => {
                    let text = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading schema {}", path.display()))?;
                    GenerationConfig::json_with_schema_str(&text)?
                }
                None if json => GenerationConfig::json(),
                None => GenerationConfig::default(),
            };
            config.temperature = temperature;
            config.max_output_tokens = max_tokens;

            let mut builder = RequestBuilder::new().text(prompt).config(config);
            if let Some(system) = system {
                builder = builder.system_instruction(system);
            }
            if strict_safety {
                builder = builder
                    .safety_settings(SafetySetting::all(HarmBlockThreshold::BlockMediumAndAbove));
            }

            println!("{}", client.generate_text(&builder.build()?).await?);
        }
        Command::Describe {
            path,
            prompt,
            inline,
        } => {
            info!("Asking Gemini about: {}", path.display());
            let attachment = if inline {
                let data = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                ContentPart::inline_image(data)
            } else {
                let resource = client.uploads().upload_path(&path).await?;
                ContentPart::from(&resource)
            };

            let request = RequestBuilder::new().text(prompt).part(attachment).build()?;
            println!("{}", client.generate_text(&request).await?);
        }
        Command::Image { prompt, output } => {
            let request = RequestBuilder::new()
                .text(prompt)
                .config(
                    GenerationConfig::default()
                        .with_response_modalities(vec![Modality::Text, Modality::Image]),
                )
                .build()?;
            let response = client.generate(&request).await?;
            let (data, media_type) = extract_binary(&response)?;
            tokio::fs::write(&output, data)
                .await
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Saved {} image to {}", media_type, output.display());
        }
        Command::Chat => chat_loop(client).await?,
    }
    Ok(())
}

async fn chat_loop(client: &GenAiClient) -> Result<()> {
    let mut chat = client.start_chat();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Type 'quit' to, well, quit.\n");
    loop {
        stdout.write_all(b"Your question: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line == "quit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match chat.send(line).await {
            Ok(reply) => println!("Gemini says: {}", reply),
            Err(e) => eprintln!("{}: {}", e.kind(), e),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_prompt_client=info,gemini_prompt=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(model) = args.model {
        config.model = model;
    }

    let client = GenAiClient::from_config(&config)?;

    if let Err(e) = run(&client, args.command).await {
        match e.downcast_ref::<gemini_prompt_client::Error>() {
            Some(err) => error!("{}: {}", err.kind(), err),
            None => error!("{:#}", e),
        }
        std::process::exit(1);
    }
    Ok(())
}
