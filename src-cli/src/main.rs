//! `dotlabel`: render images as dot-matrix thermal labels.

mod args;
mod bootstrap;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Args, Command, GenerateAction, SettingsAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    bootstrap::load_dotenv();
    let args = Args::parse();
    let foundation = bootstrap::init_foundation()?;

    match args.command {
        Command::Render(render) => commands::render(&foundation, render),
        Command::Generate { action } => match action {
            GenerateAction::Image { prompt, output } => {
                commands::generate_image(&prompt, &output).await
            }
            GenerateAction::Label { context, save } => {
                commands::generate_label(&foundation, &context, save).await
            }
        },
        Command::Settings { action } => match action {
            SettingsAction::Show => commands::settings_show(&foundation),
            SettingsAction::Set { assignments } => {
                commands::settings_set(&foundation, &assignments).await
            }
            SettingsAction::Reset => commands::settings_reset(&foundation),
        },
    }
}
